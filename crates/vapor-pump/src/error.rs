/// Errors from starting the callback pump.
#[derive(Debug, thiserror::Error)]
pub enum PumpError {
    /// The OS refused to create the background thread.
    #[error("failed to spawn callback pump thread: {0}")]
    Spawn(#[source] std::io::Error),
}
