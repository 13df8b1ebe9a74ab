use std::fmt;

use vapor_native::AuthSessionResponse;

/// Where an authentication session stands.
///
/// A session starts in [`Unknown`](Self::Unknown): the platform has not
/// answered yet, so the claimed identity must not be trusted, but the
/// session may continue. [`Ok`](Self::Ok) means the identity is verified
/// and the user owns the game. Every other status except
/// [`Closed`](Self::Closed) is a rejection, and the platform may still
/// send a later verdict for the same session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Unknown,
    Ok,
    UserNotConnected,
    NoLicenseOrExpired,
    VacBanned,
    LoggedInElsewhere,
    VacCheckTimedOut,
    /// The issuer cancelled the ticket. Also seen when the remote side
    /// closes the session first.
    Canceled,
    AlreadyUsed,
    Invalid,
    /// Banned through the web API rather than VAC.
    PublisherBanned,
    /// A verdict code this binding does not know.
    Unrecognized(i32),
    /// Closed locally. Terminal.
    Closed,
}

impl SessionStatus {
    /// Whether the claimed identity may be trusted.
    pub fn is_verified(self) -> bool {
        self == Self::Ok
    }

    /// Whether the platform rejected the ticket.
    pub fn is_rejected(self) -> bool {
        !matches!(self, Self::Unknown | Self::Ok | Self::Closed)
    }
}

impl From<AuthSessionResponse> for SessionStatus {
    fn from(response: AuthSessionResponse) -> Self {
        match response {
            AuthSessionResponse::Ok => Self::Ok,
            AuthSessionResponse::UserNotConnectedToSteam => Self::UserNotConnected,
            AuthSessionResponse::NoLicenseOrExpired => Self::NoLicenseOrExpired,
            AuthSessionResponse::VacBanned => Self::VacBanned,
            AuthSessionResponse::LoggedInElsewhere => Self::LoggedInElsewhere,
            AuthSessionResponse::VacCheckTimedOut => Self::VacCheckTimedOut,
            AuthSessionResponse::AuthTicketCanceled => Self::Canceled,
            AuthSessionResponse::AuthTicketInvalidAlreadyUsed => Self::AlreadyUsed,
            AuthSessionResponse::AuthTicketInvalid => Self::Invalid,
            AuthSessionResponse::PublisherIssuedBan => Self::PublisherBanned,
            AuthSessionResponse::Unknown(raw) => Self::Unrecognized(raw),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Ok => "ok",
            Self::UserNotConnected => "user not connected",
            Self::NoLicenseOrExpired => "no license or expired",
            Self::VacBanned => "VAC banned",
            Self::LoggedInElsewhere => "logged in elsewhere",
            Self::VacCheckTimedOut => "VAC check timed out",
            Self::Canceled => "canceled",
            Self::AlreadyUsed => "ticket already used",
            Self::Invalid => "ticket invalid",
            Self::PublisherBanned => "publisher banned",
            Self::Unrecognized(raw) => return write!(f, "unrecognized ({raw})"),
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}
