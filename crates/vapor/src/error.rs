//! Unified error type for the Vapor bindings.

use vapor_auth::{AuthError, BeginSessionError};
use vapor_controller::ControllerError;
use vapor_native::NativeError;
use vapor_net::{P2PError, SendError};
use vapor_pump::PumpError;
use vapor_runtime::InitError;
use vapor_voice::{DecompressError, VoiceError};

/// Top-level error wrapping every sub-crate error.
///
/// The `#[from]` conversions let `?` lift sub-crate errors into this one.
#[derive(Debug, thiserror::Error)]
pub enum VaporError {
    /// The SDK's shared library could not be loaded or bound.
    #[error(transparent)]
    Native(#[from] NativeError),

    /// The SDK refused to initialize.
    #[error(transparent)]
    Init(#[from] InitError),

    /// The background callback pump could not start.
    #[error(transparent)]
    Pump(#[from] PumpError),

    /// A ticket was rejected before a session could start.
    #[error(transparent)]
    BeginSession(#[from] BeginSessionError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Send(#[from] SendError),

    #[error(transparent)]
    P2P(#[from] P2PError),

    #[error(transparent)]
    Voice(#[from] VoiceError),

    /// Voice decoding failed; the partial output is still inside.
    #[error(transparent)]
    Decompress(#[from] DecompressError),

    #[error(transparent)]
    Controller(#[from] ControllerError),
}

impl VaporError {
    /// Whether retrying the same operation later may succeed.
    pub fn is_temporary(&self) -> bool {
        match self {
            Self::Send(err) => err.is_temporary(),
            Self::P2P(err) => err.is_temporary(),
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Send(err) => err.is_timeout(),
            Self::P2P(err) => err.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_init_error() {
        let err: VaporError = InitError::SteamNotRunning.into();
        assert!(matches!(err, VaporError::Init(InitError::SteamNotRunning)));
        assert!(err.to_string().contains("not running"));
    }

    #[test]
    fn test_from_native_error() {
        let err: VaporError = NativeError::MissingSymbol("SteamAPI_InitFlat".into()).into();
        assert!(matches!(err, VaporError::Native(_)));
        assert!(err.to_string().contains("SteamAPI_InitFlat"));
    }

    #[test]
    fn test_from_send_error_keeps_temporary() {
        let err: VaporError = SendError::BufferFull.into();
        assert!(err.is_temporary());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_from_p2p_timeout() {
        let err: VaporError = P2PError::Timeout.into();
        assert!(err.is_timeout());
        assert!(err.is_temporary());
    }

    #[test]
    fn test_from_voice_error_is_not_temporary() {
        let err: VaporError = VoiceError::DataCorrupted.into();
        assert!(matches!(err, VaporError::Voice(_)));
        assert!(!err.is_temporary());
    }

    #[test]
    fn test_from_auth_errors() {
        let err: VaporError = AuthError::AlreadyClosed.into();
        assert!(matches!(err, VaporError::Auth(_)));

        let err: VaporError = BeginSessionError::ExpiredTicket.into();
        assert!(matches!(err, VaporError::BeginSession(_)));
    }

    #[test]
    fn test_from_controller_error() {
        let err: VaporError = ControllerError::UnknownAction("jump".into()).into();
        assert!(matches!(err, VaporError::Controller(_)));
        assert!(err.to_string().contains("jump"));
    }
}
