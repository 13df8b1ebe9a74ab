//! Callback payload layouts.
//!
//! Each struct mirrors the SDK's `*_t` callback struct byte for byte. The
//! SDK packs callback structs to 4 bytes everywhere except Windows, where
//! it uses natural (8-byte) alignment; padding the C compiler inserts
//! implicitly is spelled out here so no struct contains uninitialized
//! bytes.
//!
//! The registry compares every delivered payload's length against
//! `size_of::<T>()` before decoding. A mismatch means the binding and the
//! SDK disagree on the ABI, and that is treated as fatal.

use std::mem::size_of;
use std::ptr;

use vapor_types::{AppId, SteamId};

use crate::AuthSessionResponse;

/// A plain-data callback payload.
///
/// # Safety
///
/// Implementors must be `#[repr(C)]` (or packed) structs with no implicit
/// padding, whose fields are all integers or arrays of integers, so that
/// every byte pattern of `size_of::<Self>()` bytes is a valid value.
pub unsafe trait CallbackPayload: Copy + Send + 'static {
    /// The SDK's `k_iCallback` value for this struct.
    const CALLBACK_TYPE: i32;
}

/// Decodes a payload delivered by the native layer.
///
/// # Panics
///
/// If `payload` is not exactly `size_of::<T>()` bytes.
pub fn decode_payload<T: CallbackPayload>(payload: &[u8]) -> T {
    assert_eq!(
        payload.len(),
        size_of::<T>(),
        "vapor: payload size mismatch for callback type {}",
        T::CALLBACK_TYPE
    );
    // SAFETY: length checked above; `CallbackPayload` guarantees every bit
    // pattern is valid, and `read_unaligned` has no alignment requirement.
    unsafe { ptr::read_unaligned(payload.as_ptr().cast::<T>()) }
}

/// The raw bytes of a payload, as the native layer would deliver them.
pub fn encode_payload<T: CallbackPayload>(value: &T) -> Vec<u8> {
    // SAFETY: `CallbackPayload` guarantees no padding, so all
    // `size_of::<T>()` bytes behind the reference are initialized.
    let bytes = unsafe {
        std::slice::from_raw_parts(ptr::from_ref(value).cast::<u8>(), size_of::<T>())
    };
    bytes.to_vec()
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// `ValidateAuthTicketResponse_t`: the verdict on a ticket submitted with
/// `begin_auth_session`.
#[cfg_attr(windows, repr(C))]
#[cfg_attr(not(windows), repr(C, packed(4)))]
#[derive(Debug, Clone, Copy)]
pub struct ValidateAuthTicketResponse {
    steam_id: u64,
    response: i32,
    #[cfg(windows)]
    _pad: [u8; 4],
    owner_steam_id: u64,
}

impl ValidateAuthTicketResponse {
    pub fn new(steam_id: SteamId, response: AuthSessionResponse, owner: SteamId) -> Self {
        Self {
            steam_id: steam_id.0,
            response: response.raw(),
            #[cfg(windows)]
            _pad: [0; 4],
            owner_steam_id: owner.0,
        }
    }

    /// The identity the ticket claimed.
    pub fn steam_id(&self) -> SteamId {
        SteamId(self.steam_id)
    }

    pub fn response(&self) -> AuthSessionResponse {
        AuthSessionResponse::from_raw(self.response)
    }

    /// The license owner; differs from [`steam_id`](Self::steam_id) when
    /// the game is borrowed through family sharing.
    pub fn owner_steam_id(&self) -> SteamId {
        SteamId(self.owner_steam_id)
    }
}

// SAFETY: integers only, explicit padding.
unsafe impl CallbackPayload for ValidateAuthTicketResponse {
    const CALLBACK_TYPE: i32 = 143;
}

// ---------------------------------------------------------------------------
// Networking
// ---------------------------------------------------------------------------

/// `P2PSessionRequest_t`: a remote user wants to open a session.
#[cfg_attr(windows, repr(C))]
#[cfg_attr(not(windows), repr(C, packed(4)))]
#[derive(Debug, Clone, Copy)]
pub struct P2PSessionRequest {
    remote: u64,
}

impl P2PSessionRequest {
    pub fn new(remote: SteamId) -> Self {
        Self { remote: remote.0 }
    }

    pub fn remote(&self) -> SteamId {
        SteamId(self.remote)
    }
}

// SAFETY: a single integer.
unsafe impl CallbackPayload for P2PSessionRequest {
    const CALLBACK_TYPE: i32 = 1202;
}

/// `P2PSessionConnectFail_t`: packets could not get through to a user.
#[cfg_attr(windows, repr(C))]
#[cfg_attr(not(windows), repr(C, packed(4)))]
#[derive(Debug, Clone, Copy)]
pub struct P2PSessionConnectFail {
    remote: u64,
    session_error: u8,
    #[cfg(windows)]
    _pad: [u8; 7],
    #[cfg(not(windows))]
    _pad: [u8; 3],
}

impl P2PSessionConnectFail {
    pub fn new(remote: SteamId, session_error: u8) -> Self {
        Self {
            remote: remote.0,
            session_error,
            _pad: Default::default(),
        }
    }

    pub fn remote(&self) -> SteamId {
        SteamId(self.remote)
    }

    /// Raw `EP2PSessionError`.
    pub fn session_error(&self) -> u8 {
        self.session_error
    }
}

// SAFETY: integers only, explicit padding.
unsafe impl CallbackPayload for P2PSessionConnectFail {
    const CALLBACK_TYPE: i32 = 1203;
}

// ---------------------------------------------------------------------------
// Utils
// ---------------------------------------------------------------------------

/// `IPCountry_t`: the user's IP country changed. Carries no data.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct IpCountryChanged {
    _empty: u8,
}

// SAFETY: one byte.
unsafe impl CallbackPayload for IpCountryChanged {
    const CALLBACK_TYPE: i32 = 701;
}

/// `LowBatteryPower_t`: sent when the battery is low, then every minute.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct LowBatteryPower {
    minutes_left: u8,
}

impl LowBatteryPower {
    pub fn new(minutes_left: u8) -> Self {
        Self { minutes_left }
    }

    pub fn minutes_left(&self) -> u8 {
        self.minutes_left
    }
}

// SAFETY: one byte.
unsafe impl CallbackPayload for LowBatteryPower {
    const CALLBACK_TYPE: i32 = 702;
}

/// `SteamShutdown_t`: the platform client is about to shut down.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SteamShutdown {
    _empty: u8,
}

// SAFETY: one byte.
unsafe impl CallbackPayload for SteamShutdown {
    const CALLBACK_TYPE: i32 = 704;
}

/// `GamepadTextInputDismissed_t`: the gamepad keyboard closed.
#[cfg_attr(windows, repr(C))]
#[cfg_attr(not(windows), repr(C, packed(4)))]
#[derive(Debug, Clone, Copy)]
pub struct GamepadTextInputDismissed {
    submitted: u8,
    _pad: [u8; 3],
    submitted_text_len: u32,
    app_id: u32,
}

impl GamepadTextInputDismissed {
    pub fn new(submitted: bool, submitted_text_len: u32, app_id: AppId) -> Self {
        Self {
            submitted: u8::from(submitted),
            _pad: [0; 3],
            submitted_text_len,
            app_id: app_id.0,
        }
    }

    /// `false` when the user cancelled.
    pub fn submitted(&self) -> bool {
        self.submitted != 0
    }

    pub fn submitted_text_len(&self) -> u32 {
        self.submitted_text_len
    }

    pub fn app_id(&self) -> AppId {
        AppId(self.app_id)
    }
}

// SAFETY: integers only (the C `bool` is read as `u8`), explicit padding.
unsafe impl CallbackPayload for GamepadTextInputDismissed {
    const CALLBACK_TYPE: i32 = 714;
}

// ---------------------------------------------------------------------------
// Parental settings
// ---------------------------------------------------------------------------

/// `SteamParentalSettingsChanged_t`. Carries no data.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ParentalSettingsChanged {
    _empty: u8,
}

// SAFETY: one byte.
unsafe impl CallbackPayload for ParentalSettingsChanged {
    const CALLBACK_TYPE: i32 = 5001;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_sizes_match_sdk_layout() {
        #[cfg(not(windows))]
        {
            assert_eq!(size_of::<ValidateAuthTicketResponse>(), 20);
            assert_eq!(size_of::<P2PSessionConnectFail>(), 12);
        }
        #[cfg(windows)]
        {
            assert_eq!(size_of::<ValidateAuthTicketResponse>(), 24);
            assert_eq!(size_of::<P2PSessionConnectFail>(), 16);
        }
        assert_eq!(size_of::<P2PSessionRequest>(), 8);
        assert_eq!(size_of::<GamepadTextInputDismissed>(), 12);
        assert_eq!(size_of::<LowBatteryPower>(), 1);
        assert_eq!(size_of::<SteamShutdown>(), 1);
    }

    #[test]
    fn test_decode_reads_encoded_fields() {
        let sent = ValidateAuthTicketResponse::new(
            SteamId(76_561_197_960_265_729),
            AuthSessionResponse::VacBanned,
            SteamId(76_561_197_960_265_730),
        );
        let got: ValidateAuthTicketResponse = decode_payload(&encode_payload(&sent));
        assert_eq!(got.steam_id(), SteamId(76_561_197_960_265_729));
        assert_eq!(got.response(), AuthSessionResponse::VacBanned);
        assert_eq!(got.owner_steam_id(), SteamId(76_561_197_960_265_730));
    }

    #[test]
    fn test_decode_unaligned_slice() {
        let sent = P2PSessionConnectFail::new(SteamId(99), 4);
        let mut bytes = vec![0u8];
        bytes.extend(encode_payload(&sent));
        let got: P2PSessionConnectFail = decode_payload(&bytes[1..]);
        assert_eq!(got.remote(), SteamId(99));
        assert_eq!(got.session_error(), 4);
    }

    #[test]
    #[should_panic(expected = "payload size mismatch")]
    fn test_decode_wrong_size_panics() {
        let _: P2PSessionRequest = decode_payload(&[0u8; 7]);
    }
}
