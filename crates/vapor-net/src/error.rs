//! Error types for the P2P layer.

/// Why a packet could not be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The target identity is not a valid user.
    #[error("target user id is invalid")]
    InvalidTarget,

    /// The packet is larger than its reliability class allows.
    #[error("packet of {len} bytes exceeds the {limit}-byte limit for its send type")]
    TooLarge { len: usize, limit: usize },

    /// Too many bytes are already queued for this user. Retry later.
    #[error("too many bytes are queued to be sent")]
    BufferFull,
}

impl SendError {
    /// Whether the send may succeed if retried without other changes.
    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::BufferFull)
    }

    pub fn is_timeout(&self) -> bool {
        false
    }
}

/// A failure reported for an established or attempted P2P session.
///
/// Delivered through [`Networking::on_connect_fail`](crate::Networking::on_connect_fail)
/// and [`SessionState::last_error`](crate::SessionState::last_error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum P2PError {
    #[error("the remote user is not running the same game")]
    NotRunningApp,

    #[error("the local user does not own the running app")]
    NoRightsToApp,

    #[error("the remote user is not connected to the platform")]
    DestinationNotLoggedIn,

    #[error("the connection timed out because the remote user did not respond")]
    Timeout,

    #[error("unknown P2P session error {0}")]
    Unknown(u8),
}

impl P2PError {
    /// Maps a raw `EP2PSessionError`. Zero means no error.
    pub fn from_raw(code: u8) -> Option<Self> {
        match code {
            0 => None,
            1 => Some(Self::NotRunningApp),
            2 => Some(Self::NoRightsToApp),
            3 => Some(Self::DestinationNotLoggedIn),
            4 => Some(Self::Timeout),
            other => Some(Self::Unknown(other)),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Whether reconnecting may succeed without any other local action.
    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}
