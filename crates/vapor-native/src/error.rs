/// Errors that can occur while binding to the native SDK.
#[derive(Debug, thiserror::Error)]
pub enum NativeError {
    /// The SDK's shared library could not be opened.
    #[error("failed to load platform SDK from {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// The library loaded but lacks an entry point the binding needs.
    /// Usually means the SDK is older than the binding expects.
    #[error("platform SDK is missing symbol `{0}`")]
    MissingSymbol(String),
}
