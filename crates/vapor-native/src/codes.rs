//! Raw SDK result codes and enumerations.
//!
//! The SDK hands these around as plain integers. Each one becomes a closed
//! enum here so every `match` over them is exhaustive; codes a newer SDK
//! might add land in an `Unknown` variant instead of being misread.

/// Result of submitting a ticket for verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginAuthSessionResult {
    Ok,
    InvalidTicket,
    DuplicateRequest,
    InvalidVersion,
    GameMismatch,
    ExpiredTicket,
    Unknown(i32),
}

impl BeginAuthSessionResult {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Ok,
            1 => Self::InvalidTicket,
            2 => Self::DuplicateRequest,
            3 => Self::InvalidVersion,
            4 => Self::GameMismatch,
            5 => Self::ExpiredTicket,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::InvalidTicket => 1,
            Self::DuplicateRequest => 2,
            Self::InvalidVersion => 3,
            Self::GameMismatch => 4,
            Self::ExpiredTicket => 5,
            Self::Unknown(raw) => raw,
        }
    }
}

/// Asynchronous verdict on a ticket, delivered with
/// [`ValidateAuthTicketResponse`](crate::ValidateAuthTicketResponse).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSessionResponse {
    Ok,
    UserNotConnectedToSteam,
    NoLicenseOrExpired,
    VacBanned,
    LoggedInElsewhere,
    VacCheckTimedOut,
    AuthTicketCanceled,
    AuthTicketInvalidAlreadyUsed,
    AuthTicketInvalid,
    PublisherIssuedBan,
    Unknown(i32),
}

impl AuthSessionResponse {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Ok,
            1 => Self::UserNotConnectedToSteam,
            2 => Self::NoLicenseOrExpired,
            3 => Self::VacBanned,
            4 => Self::LoggedInElsewhere,
            5 => Self::VacCheckTimedOut,
            6 => Self::AuthTicketCanceled,
            7 => Self::AuthTicketInvalidAlreadyUsed,
            8 => Self::AuthTicketInvalid,
            9 => Self::PublisherIssuedBan,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::UserNotConnectedToSteam => 1,
            Self::NoLicenseOrExpired => 2,
            Self::VacBanned => 3,
            Self::LoggedInElsewhere => 4,
            Self::VacCheckTimedOut => 5,
            Self::AuthTicketCanceled => 6,
            Self::AuthTicketInvalidAlreadyUsed => 7,
            Self::AuthTicketInvalid => 8,
            Self::PublisherIssuedBan => 9,
            Self::Unknown(raw) => raw,
        }
    }
}

/// Handle to a ticket issued by `get_auth_session_ticket`. Zero is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthTicketHandle(pub u32);

impl AuthTicketHandle {
    pub const INVALID: AuthTicketHandle = AuthTicketHandle(0);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserHasLicense {
    HasLicense,
    DoesNotHaveLicense,
    /// The user has not been authenticated.
    NoAuth,
    Unknown(i32),
}

impl UserHasLicense {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::HasLicense,
            1 => Self::DoesNotHaveLicense,
            2 => Self::NoAuth,
            other => Self::Unknown(other),
        }
    }
}

/// Delivery class for a P2P send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum P2PSend {
    Unreliable,
    UnreliableNoDelay,
    Reliable,
    ReliableWithBuffering,
}

impl P2PSend {
    pub fn raw(self) -> i32 {
        match self {
            Self::Unreliable => 0,
            Self::UnreliableNoDelay => 1,
            Self::Reliable => 2,
            Self::ReliableWithBuffering => 3,
        }
    }
}

/// `P2PSessionState_t`, filled in by the SDK.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct P2PSessionStateRaw {
    pub connection_active: u8,
    pub connecting: u8,
    /// Last `EP2PSessionError` recorded on the socket.
    pub session_error: u8,
    pub using_relay: u8,
    pub bytes_queued_for_send: i32,
    pub packets_queued_for_send: i32,
    pub remote_ip: u32,
    pub remote_port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceResult {
    Ok,
    NotInitialized,
    NotRecording,
    NoData,
    BufferTooSmall,
    DataCorrupted,
    Restricted,
    UnsupportedCodec,
    ReceiverOutOfDate,
    ReceiverDidNotAnswer,
    Unknown(i32),
}

impl VoiceResult {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Ok,
            1 => Self::NotInitialized,
            2 => Self::NotRecording,
            3 => Self::NoData,
            4 => Self::BufferTooSmall,
            5 => Self::DataCorrupted,
            6 => Self::Restricted,
            7 => Self::UnsupportedCodec,
            8 => Self::ReceiverOutOfDate,
            9 => Self::ReceiverDidNotAnswer,
            other => Self::Unknown(other),
        }
    }
}

/// Screen corner for overlay notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl NotificationPosition {
    pub fn raw(self) -> i32 {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomLeft => 2,
            Self::BottomRight => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamepadTextInputMode {
    #[default]
    Normal,
    Password,
}

impl GamepadTextInputMode {
    pub fn raw(self) -> i32 {
        match self {
            Self::Normal => 0,
            Self::Password => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamepadTextLineMode {
    #[default]
    SingleLine,
    MultipleLines,
}

impl GamepadTextLineMode {
    pub fn raw(self) -> i32 {
        match self {
            Self::SingleLine => 0,
            Self::MultipleLines => 1,
        }
    }
}

/// Client features a parental lock can restrict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentalFeature {
    Store,
    Community,
    Profile,
    Friends,
    News,
    Trading,
    Settings,
    Console,
    Browser,
    ParentalSetup,
    Library,
    Test,
    SiteLicense,
}

impl ParentalFeature {
    pub fn raw(self) -> i32 {
        match self {
            Self::Store => 1,
            Self::Community => 2,
            Self::Profile => 3,
            Self::Friends => 4,
            Self::News => 5,
            Self::Trading => 6,
            Self::Settings => 7,
            Self::Console => 8,
            Self::Browser => 9,
            Self::ParentalSetup => 10,
            Self::Library => 11,
            Self::Test => 12,
            Self::SiteLicense => 13,
        }
    }
}

/// Severity of a diagnostic line the SDK prints through its message hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageSeverity {
    /// Only produced when the client runs with `-debug_steamapi`.
    Debug,
    Warning,
}

impl MessageSeverity {
    /// Zero is a debug message; anything else is treated as a warning.
    pub fn from_raw(raw: i32) -> Self {
        if raw == 0 { Self::Debug } else { Self::Warning }
    }
}
