//! Error types for SDK initialization.

/// Why the SDK could not be initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    /// The platform client is not running. It provides the implementations
    /// of every SDK interface, so nothing works without it.
    #[error("the platform client is not running")]
    SteamNotRunning,

    /// The client is running but refused to initialize this process.
    /// Usually the app id could not be determined, the process runs as a
    /// different OS user than the client, or the account has no license.
    #[error("failed to initialize the platform SDK")]
    InitFailed,
}
