//! Error types for the auth layer.

use crate::AuthSession;

/// Why a ticket could not start a session.
#[derive(Debug, thiserror::Error)]
pub enum BeginSessionError {
    /// The ticket is malformed, or empty.
    #[error("invalid ticket")]
    InvalidTicket,

    /// A session for this identity is already active.
    ///
    /// `existing` is a new handle to that session when this binding knows
    /// about it. Callers that treat a repeated ticket as success can take
    /// it with [`into_existing`](Self::into_existing).
    #[error("there is already an active session for this user")]
    DuplicateRequest { existing: Option<AuthSession> },

    /// The ticket came from an incompatible SDK version.
    #[error("ticket is from an incompatible SDK version")]
    InvalidVersion,

    #[error("ticket is for a different game")]
    GameMismatch,

    #[error("ticket is expired")]
    ExpiredTicket,

    #[error("unknown begin-session result {0}")]
    Unknown(i32),
}

impl BeginSessionError {
    /// The already-active session, for a duplicate request.
    pub fn into_existing(self) -> Option<AuthSession> {
        match self {
            Self::DuplicateRequest { existing } => existing,
            _ => None,
        }
    }
}

/// Errors from auth session handles and tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The session was already closed, through this handle or another.
    #[error("session was already closed")]
    AlreadyClosed,

    /// The platform did not issue a ticket.
    #[error("no auth ticket was issued")]
    TicketUnavailable,
}
