#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    /// [`Controllers::init`](crate::Controllers::init) has not succeeded
    /// since the last shutdown.
    #[error("controller input has not been initialized")]
    NotInitialized,

    #[error("controller subsystem failed to start")]
    InitFailed,

    /// No action set with this name in the game's action manifest.
    #[error("unknown action set `{0}`")]
    UnknownActionSet(String),

    /// No action with this name in the game's action manifest.
    #[error("unknown action `{0}`")]
    UnknownAction(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_names_are_quoted() {
        assert_eq!(
            ControllerError::UnknownActionSet("Drive".into()).to_string(),
            "unknown action set `Drive`"
        );
        assert_eq!(
            ControllerError::UnknownAction("jump".into()).to_string(),
            "unknown action `jump`"
        );
    }
}
