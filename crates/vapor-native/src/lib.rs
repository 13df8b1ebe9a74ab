//! Native call surface for Vapor.
//!
//! The platform SDK is a black box. Everything the binding needs from it
//! goes through the [`NativeApi`] trait, and everything it sends back
//! arrives through [`CallbackSink`] while [`NativeApi::run_callbacks`] runs.
//!
//! ```text
//! vapor-runtime (registry, pump)   ← owns handlers, drives run_callbacks
//!     ↕  NativeApi / CallbackSink
//! vapor-native (this crate)        ← raw codes, payload layouts, loaders
//!     ↕  flat C API
//! platform SDK                     ← never reimplemented
//! ```
//!
//! # Feature Flags
//!
//! - `dylib` (default): [`SteamSdk`], which loads the SDK's shared
//!   library at runtime via `libloading`.
//! - `fake`: [`FakeNative`], a scriptable in-process stand-in used by
//!   the test suites of the other crates.

mod codes;
mod controller;
mod dispatch;
mod error;
#[cfg(any(test, feature = "fake"))]
mod fake;
mod payload;
#[cfg(feature = "dylib")]
mod sdk;

pub use codes::{
    AuthSessionResponse, AuthTicketHandle, BeginAuthSessionResult,
    GamepadTextInputMode, GamepadTextLineMode, MessageSeverity,
    NotificationPosition, P2PSend, P2PSessionStateRaw, ParentalFeature,
    UserHasLicense, VoiceResult,
};
pub use controller::{
    ActionOrigin, ActionSetHandle, AnalogActionDataRaw, AnalogActionHandle,
    ControllerHandle, ControllerPad, DigitalActionDataRaw, DigitalActionHandle,
    LedFlag, MAX_CONTROLLERS, MAX_ORIGINS, MotionDataRaw, SourceMode,
};
pub use error::NativeError;
#[cfg(any(test, feature = "fake"))]
pub use fake::{ControllerCommand, FakeNative, SentPacket};
pub use payload::{
    CallbackPayload, GamepadTextInputDismissed, IpCountryChanged,
    LowBatteryPower, P2PSessionConnectFail, P2PSessionRequest,
    ParentalSettingsChanged, SteamShutdown, ValidateAuthTicketResponse,
    decode_payload, encode_payload,
};
#[cfg(feature = "dylib")]
pub use sdk::SteamSdk;

use std::fmt;
use std::sync::Arc;

use vapor_types::{AppId, SteamId};

/// Identifier of a callback slot allocated by the native layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(i32);

impl CallbackId {
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub fn into_inner(self) -> i32 {
        self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cb-{}", self.0)
    }
}

/// Receives every diagnostic line the SDK prints. Installed with
/// [`NativeApi::set_message_hook`]; may be called on any thread.
pub type MessageHook = Arc<dyn Fn(MessageSeverity, &str) + Send + Sync>;

/// Receives callbacks from the native layer.
///
/// The native layer calls [`dispatch`](Self::dispatch) once per delivered
/// event per registered slot, on whatever thread is inside
/// [`NativeApi::run_callbacks`].
pub trait CallbackSink {
    fn dispatch(&self, id: CallbackId, payload: &[u8]);
}

/// The fixed set of native entry points the binding relies on.
///
/// Implementations must guarantee:
/// 1. callback ids are stable for the lifetime of a registration,
/// 2. the synchronous queries are safe to call from the pump thread,
/// 3. each asynchronous result is delivered exactly once per request.
///
/// Calling anything other than the lifecycle functions before a
/// successful [`init`](Self::init) is a contract violation.
pub trait NativeApi: Send + Sync + 'static {
    // -- Lifecycle --------------------------------------------------------

    /// Initializes the SDK. `false` means some required interface could
    /// not be acquired.
    fn init(&self) -> bool;

    fn is_steam_running(&self) -> bool;

    fn shutdown(&self);

    /// `true` means the process was not launched by the platform client
    /// and has been relaunched through it; the caller should exit.
    fn restart_app_if_necessary(&self, app_id: AppId) -> bool;

    /// Frees the SDK's thread-local scratch memory for the calling thread.
    fn release_current_thread_memory(&self);

    // -- Callbacks --------------------------------------------------------

    /// Allocates a slot for callbacks of `callback_type` whose payloads
    /// are exactly `payload_size` bytes.
    fn register_callback(&self, payload_size: usize, callback_type: i32) -> CallbackId;

    fn unregister_callback(&self, id: CallbackId);

    /// Delivers every pending callback to `sink`, synchronously, on the
    /// calling thread.
    ///
    /// Only one thread delivers at a time. A call that finds delivery
    /// already under way, on another thread or further up its own stack,
    /// returns without delivering anything.
    fn run_callbacks(&self, sink: &dyn CallbackSink);

    // -- User / authentication -------------------------------------------

    fn steam_id(&self) -> SteamId;

    fn begin_auth_session(&self, ticket: &[u8], steam_id: SteamId) -> BeginAuthSessionResult;

    fn end_auth_session(&self, steam_id: SteamId);

    /// Writes a ticket into `buffer`, returning its handle and length.
    fn get_auth_session_ticket(&self, buffer: &mut [u8]) -> (AuthTicketHandle, usize);

    fn cancel_auth_ticket(&self, handle: AuthTicketHandle);

    fn user_has_license_for_app(&self, steam_id: SteamId, app_id: AppId) -> UserHasLicense;

    // -- P2P networking ---------------------------------------------------

    fn send_p2p_packet(&self, remote: SteamId, data: &[u8], send: P2PSend, channel: i32) -> bool;

    /// Size of the next packet on `channel`, if one is waiting.
    fn is_p2p_packet_available(&self, channel: i32) -> Option<u32>;

    /// Reads the next packet on `channel` into `buffer`, returning the
    /// number of bytes written and the sender.
    fn read_p2p_packet(&self, buffer: &mut [u8], channel: i32) -> Option<(u32, SteamId)>;

    fn accept_p2p_session(&self, remote: SteamId) -> bool;

    fn close_p2p_session(&self, remote: SteamId) -> bool;

    fn close_p2p_channel(&self, remote: SteamId, channel: i32) -> bool;

    fn p2p_session_state(&self, remote: SteamId) -> Option<P2PSessionStateRaw>;

    fn allow_p2p_packet_relay(&self, allow: bool) -> bool;

    // -- Voice ------------------------------------------------------------

    fn start_voice_recording(&self);

    fn stop_voice_recording(&self);

    /// Bytes of compressed voice waiting to be read.
    fn available_voice(&self) -> (VoiceResult, u32);

    fn get_voice(&self, buffer: &mut [u8]) -> (VoiceResult, u32);

    fn decompress_voice(&self, compressed: &[u8], out: &mut [u8], sample_rate: u32) -> (VoiceResult, u32);

    fn voice_optimal_sample_rate(&self) -> u32;

    fn set_in_game_voice_speaking(&self, speaking: bool);

    // -- Utils ------------------------------------------------------------

    fn app_id(&self) -> AppId;

    /// Two-letter ISO 3166-1-alpha-2 country code for the user's IP.
    fn ip_country(&self) -> String;

    /// Battery percentage, or 255 when on AC power.
    fn current_battery_power(&self) -> u8;

    fn seconds_since_app_active(&self) -> u32;

    fn seconds_since_computer_active(&self) -> u32;

    /// Server time as seconds since the Unix epoch.
    fn server_real_time(&self) -> u32;

    fn is_overlay_enabled(&self) -> bool;

    fn overlay_needs_present(&self) -> bool;

    fn is_steam_in_big_picture_mode(&self) -> bool;

    fn set_overlay_notification_position(&self, position: NotificationPosition);

    fn set_overlay_notification_inset(&self, horizontal: i32, vertical: i32);

    fn show_gamepad_text_input(
        &self,
        mode: GamepadTextInputMode,
        line_mode: GamepadTextLineMode,
        description: &str,
        max_chars: u32,
        existing_text: &str,
    ) -> bool;

    /// Text the user submitted in the gamepad keyboard, `length` bytes long.
    fn entered_gamepad_text(&self, length: u32) -> Option<String>;

    /// Installs the hook for SDK debug and warning output, replacing any
    /// previous one. `None` removes it.
    fn set_message_hook(&self, hook: Option<MessageHook>);

    fn is_steam_running_in_vr(&self) -> bool;

    /// Asks the platform to open its VR dashboard.
    fn start_vr_dashboard(&self);

    /// Whether the headset view, rather than the desktop window, is what
    /// in-home streaming sends.
    fn is_vr_headset_streaming_enabled(&self) -> bool;

    fn set_vr_headset_streaming_enabled(&self, enabled: bool);

    // -- Parental settings ------------------------------------------------

    fn is_parental_lock_enabled(&self) -> bool;

    fn is_parental_lock_locked(&self) -> bool;

    fn is_app_blocked(&self, app_id: AppId) -> bool;

    fn is_app_in_block_list(&self, app_id: AppId) -> bool;

    fn is_feature_blocked(&self, feature: ParentalFeature) -> bool;

    fn is_feature_in_block_list(&self, feature: ParentalFeature) -> bool;

    // -- Controller input -------------------------------------------------

    /// Starts the controller subsystem. Safe to call more than once.
    fn controller_init(&self) -> bool;

    fn controller_shutdown(&self) -> bool;

    /// Polls controller state. Also happens inside `run_callbacks`; call
    /// this for fresher input between pumps.
    fn controller_run_frame(&self);

    /// At most [`MAX_CONTROLLERS`] handles.
    fn connected_controllers(&self) -> Vec<ControllerHandle>;

    fn controller_for_gamepad_index(&self, index: i32) -> ControllerHandle;

    /// -1 if the controller is not emulating a gamepad.
    fn gamepad_index_for_controller(&self, controller: ControllerHandle) -> i32;

    fn action_set_handle(&self, name: &str) -> ActionSetHandle;

    fn activate_action_set(&self, controller: ControllerHandle, set: ActionSetHandle);

    fn current_action_set(&self, controller: ControllerHandle) -> ActionSetHandle;

    fn digital_action_handle(&self, name: &str) -> DigitalActionHandle;

    fn digital_action_data(&self, controller: ControllerHandle, action: DigitalActionHandle) -> DigitalActionDataRaw;

    /// At most [`MAX_ORIGINS`] origins.
    fn digital_action_origins(
        &self,
        controller: ControllerHandle,
        set: ActionSetHandle,
        action: DigitalActionHandle,
    ) -> Vec<ActionOrigin>;

    fn analog_action_handle(&self, name: &str) -> AnalogActionHandle;

    fn analog_action_data(&self, controller: ControllerHandle, action: AnalogActionHandle) -> AnalogActionDataRaw;

    /// At most [`MAX_ORIGINS`] origins.
    fn analog_action_origins(
        &self,
        controller: ControllerHandle,
        set: ActionSetHandle,
        action: AnalogActionHandle,
    ) -> Vec<ActionOrigin>;

    fn stop_analog_action_momentum(&self, controller: ControllerHandle, action: AnalogActionHandle);

    fn trigger_haptic_pulse(&self, controller: ControllerHandle, pad: ControllerPad, micros: u16);

    fn trigger_repeated_haptic_pulse(
        &self,
        controller: ControllerHandle,
        pad: ControllerPad,
        on_micros: u16,
        off_micros: u16,
        repeat: u16,
    );

    fn trigger_vibration(&self, controller: ControllerHandle, left_speed: u16, right_speed: u16);

    fn set_led_color(&self, controller: ControllerHandle, rgb: [u8; 3], flag: LedFlag);

    fn show_binding_panel(&self, controller: ControllerHandle) -> bool;

    fn motion_data(&self, controller: ControllerHandle) -> MotionDataRaw;

    /// Path to a PNG glyph for `origin`; empty if the SDK has none.
    fn glyph_for_action_origin(&self, origin: ActionOrigin) -> String;

    /// Localized name of `origin`, e.g. "Left Trigger".
    fn string_for_action_origin(&self, origin: ActionOrigin) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_id_new_and_into_inner() {
        assert_eq!(CallbackId::new(42).into_inner(), 42);
    }

    #[test]
    fn test_callback_id_display() {
        assert_eq!(CallbackId::new(7).to_string(), "cb-7");
    }
}
