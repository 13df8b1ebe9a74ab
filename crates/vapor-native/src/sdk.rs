//! [`NativeApi`] backed by the platform SDK's shared library.
//!
//! The library is opened at runtime with `libloading` and every flat C
//! entry point is resolved up front, so a missing symbol fails at load
//! time instead of at first use.
//!
//! Callbacks use the SDK's manual-dispatch mode: instead of C++ callback
//! objects, [`run_callbacks`](NativeApi::run_callbacks) pulls each pending
//! message off the pipe and fans it out to every slot registered for its
//! type. Slots live entirely on this side of the boundary.
//!
//! The pipe holds one "last callback" at a time, so only one thread may
//! walk it. Pumps that arrive while another thread is already walking the
//! pipe return immediately; their callbacks are delivered by the walk in
//! progress.

use std::collections::HashMap;
use std::ffi::{CStr, CString, c_char, c_void};
use std::mem::MaybeUninit;
use std::path::Path;
use std::ptr;
use std::sync::atomic::{AtomicI32, AtomicPtr, Ordering};
use std::sync::{Mutex, PoisonError};

use libloading::Library;
use vapor_types::{AppId, SteamId};

use crate::dispatch::DispatchGate;
use crate::{
    ActionOrigin, ActionSetHandle, AnalogActionDataRaw, AnalogActionHandle,
    AuthTicketHandle, BeginAuthSessionResult, CallbackId, CallbackSink,
    ControllerHandle, ControllerPad, DigitalActionDataRaw, DigitalActionHandle,
    GamepadTextInputMode, GamepadTextLineMode, LedFlag, MAX_CONTROLLERS,
    MAX_ORIGINS, MessageHook, MessageSeverity, MotionDataRaw, NativeApi,
    NativeError, NotificationPosition, P2PSend, P2PSessionStateRaw,
    ParentalFeature, UserHasLicense, VoiceResult,
};

type Iface = *mut c_void;
type Pipe = i32;
type WarningHook = unsafe extern "C" fn(i32, *const c_char);

/// `CallbackMsg_t` as handed out by manual dispatch.
#[cfg_attr(windows, repr(C))]
#[cfg_attr(not(windows), repr(C, packed(4)))]
#[derive(Clone, Copy)]
struct CallbackMsg {
    user: i32,
    callback: i32,
    param: *mut u8,
    param_len: i32,
}

/// Length of `SteamErrMsg`.
const ERR_MSG_LEN: usize = 1024;

// ---------------------------------------------------------------------------
// Flat API table
// ---------------------------------------------------------------------------

macro_rules! flat_api {
    ($( $field:ident = $symbol:literal : fn($($arg:ty),*) $(-> $ret:ty)?; )*) => {
        struct FlatApi {
            $( $field: unsafe extern "C" fn($($arg),*) $(-> $ret)?, )*
        }

        impl FlatApi {
            fn resolve(lib: &Library) -> Result<Self, NativeError> {
                Ok(Self {
                    // SAFETY: each signature below matches the SDK's
                    // `steam_api_flat.h` declaration for that symbol.
                    $( $field: unsafe { symbol(lib, $symbol)? }, )*
                })
            }
        }
    };
}

flat_api! {
    init_flat = "SteamAPI_InitFlat": fn(*mut c_char) -> i32;
    shutdown = "SteamAPI_Shutdown": fn();
    is_steam_running = "SteamAPI_IsSteamRunning": fn() -> bool;
    restart_app_if_necessary = "SteamAPI_RestartAppIfNecessary": fn(u32) -> bool;
    release_current_thread_memory = "SteamAPI_ReleaseCurrentThreadMemory": fn();
    get_pipe = "SteamAPI_GetHSteamPipe": fn() -> Pipe;
    manual_dispatch_init = "SteamAPI_ManualDispatch_Init": fn();
    manual_dispatch_run_frame = "SteamAPI_ManualDispatch_RunFrame": fn(Pipe);
    manual_dispatch_next = "SteamAPI_ManualDispatch_GetNextCallback": fn(Pipe, *mut CallbackMsg) -> bool;
    manual_dispatch_free = "SteamAPI_ManualDispatch_FreeLastCallback": fn(Pipe);

    user_iface = "SteamAPI_SteamUser_v023": fn() -> Iface;
    friends_iface = "SteamAPI_SteamFriends_v017": fn() -> Iface;
    utils_iface = "SteamAPI_SteamUtils_v010": fn() -> Iface;
    networking_iface = "SteamAPI_SteamNetworking_v006": fn() -> Iface;
    parental_iface = "SteamAPI_SteamParentalSettings_v001": fn() -> Iface;
    controller_iface = "SteamAPI_SteamController_v008": fn() -> Iface;

    user_steam_id = "SteamAPI_ISteamUser_GetSteamID": fn(Iface) -> u64;
    user_begin_auth = "SteamAPI_ISteamUser_BeginAuthSession": fn(Iface, *const c_void, i32, u64) -> i32;
    user_end_auth = "SteamAPI_ISteamUser_EndAuthSession": fn(Iface, u64);
    user_get_ticket = "SteamAPI_ISteamUser_GetAuthSessionTicket": fn(Iface, *mut c_void, i32, *mut u32, *const c_void) -> u32;
    user_cancel_ticket = "SteamAPI_ISteamUser_CancelAuthTicket": fn(Iface, u32);
    user_has_license = "SteamAPI_ISteamUser_UserHasLicenseForApp": fn(Iface, u64, u32) -> i32;
    user_start_voice = "SteamAPI_ISteamUser_StartVoiceRecording": fn(Iface);
    user_stop_voice = "SteamAPI_ISteamUser_StopVoiceRecording": fn(Iface);
    user_available_voice = "SteamAPI_ISteamUser_GetAvailableVoice": fn(Iface, *mut u32, *mut u32, u32) -> i32;
    user_get_voice = "SteamAPI_ISteamUser_GetVoice": fn(Iface, bool, *mut c_void, u32, *mut u32, bool, *mut c_void, u32, *mut u32, u32) -> i32;
    user_decompress_voice = "SteamAPI_ISteamUser_DecompressVoice": fn(Iface, *const c_void, u32, *mut c_void, u32, *mut u32, u32) -> i32;
    user_voice_sample_rate = "SteamAPI_ISteamUser_GetVoiceOptimalSampleRate": fn(Iface) -> u32;

    friends_voice_speaking = "SteamAPI_ISteamFriends_SetInGameVoiceSpeaking": fn(Iface, u64, bool);

    net_send = "SteamAPI_ISteamNetworking_SendP2PPacket": fn(Iface, u64, *const c_void, u32, i32, i32) -> bool;
    net_available = "SteamAPI_ISteamNetworking_IsP2PPacketAvailable": fn(Iface, *mut u32, i32) -> bool;
    net_read = "SteamAPI_ISteamNetworking_ReadP2PPacket": fn(Iface, *mut c_void, u32, *mut u32, *mut u64, i32) -> bool;
    net_accept = "SteamAPI_ISteamNetworking_AcceptP2PSessionWithUser": fn(Iface, u64) -> bool;
    net_close_session = "SteamAPI_ISteamNetworking_CloseP2PSessionWithUser": fn(Iface, u64) -> bool;
    net_close_channel = "SteamAPI_ISteamNetworking_CloseP2PChannelWithUser": fn(Iface, u64, i32) -> bool;
    net_session_state = "SteamAPI_ISteamNetworking_GetP2PSessionState": fn(Iface, u64, *mut P2PSessionStateRaw) -> bool;
    net_allow_relay = "SteamAPI_ISteamNetworking_AllowP2PPacketRelay": fn(Iface, bool) -> bool;

    utils_app_id = "SteamAPI_ISteamUtils_GetAppID": fn(Iface) -> u32;
    utils_ip_country = "SteamAPI_ISteamUtils_GetIPCountry": fn(Iface) -> *const c_char;
    utils_battery = "SteamAPI_ISteamUtils_GetCurrentBatteryPower": fn(Iface) -> u8;
    utils_app_active = "SteamAPI_ISteamUtils_GetSecondsSinceAppActive": fn(Iface) -> u32;
    utils_computer_active = "SteamAPI_ISteamUtils_GetSecondsSinceComputerActive": fn(Iface) -> u32;
    utils_server_time = "SteamAPI_ISteamUtils_GetServerRealTime": fn(Iface) -> u32;
    utils_overlay_enabled = "SteamAPI_ISteamUtils_IsOverlayEnabled": fn(Iface) -> bool;
    utils_overlay_present = "SteamAPI_ISteamUtils_BOverlayNeedsPresent": fn(Iface) -> bool;
    utils_big_picture = "SteamAPI_ISteamUtils_IsSteamInBigPictureMode": fn(Iface) -> bool;
    utils_notification_position = "SteamAPI_ISteamUtils_SetOverlayNotificationPosition": fn(Iface, i32);
    utils_notification_inset = "SteamAPI_ISteamUtils_SetOverlayNotificationInset": fn(Iface, i32, i32);
    utils_show_text_input = "SteamAPI_ISteamUtils_ShowGamepadTextInput": fn(Iface, i32, i32, *const c_char, u32, *const c_char) -> bool;
    utils_entered_text = "SteamAPI_ISteamUtils_GetEnteredGamepadTextInput": fn(Iface, *mut c_char, u32) -> bool;
    utils_set_warning_hook = "SteamAPI_ISteamUtils_SetWarningMessageHook": fn(Iface, Option<WarningHook>);
    utils_running_in_vr = "SteamAPI_ISteamUtils_IsSteamRunningInVR": fn(Iface) -> bool;
    utils_start_vr_dashboard = "SteamAPI_ISteamUtils_StartVRDashboard": fn(Iface);
    utils_vr_streaming = "SteamAPI_ISteamUtils_IsVRHeadsetStreamingEnabled": fn(Iface) -> bool;
    utils_set_vr_streaming = "SteamAPI_ISteamUtils_SetVRHeadsetStreamingEnabled": fn(Iface, bool);

    parental_lock_enabled = "SteamAPI_ISteamParentalSettings_BIsParentalLockEnabled": fn(Iface) -> bool;
    parental_lock_locked = "SteamAPI_ISteamParentalSettings_BIsParentalLockLocked": fn(Iface) -> bool;
    parental_app_blocked = "SteamAPI_ISteamParentalSettings_BIsAppBlocked": fn(Iface, u32) -> bool;
    parental_app_in_list = "SteamAPI_ISteamParentalSettings_BIsAppInBlockList": fn(Iface, u32) -> bool;
    parental_feature_blocked = "SteamAPI_ISteamParentalSettings_BIsFeatureBlocked": fn(Iface, i32) -> bool;
    parental_feature_in_list = "SteamAPI_ISteamParentalSettings_BIsFeatureInBlockList": fn(Iface, i32) -> bool;

    controller_init = "SteamAPI_ISteamController_Init": fn(Iface) -> bool;
    controller_shutdown = "SteamAPI_ISteamController_Shutdown": fn(Iface) -> bool;
    controller_run_frame = "SteamAPI_ISteamController_RunFrame": fn(Iface);
    controller_connected = "SteamAPI_ISteamController_GetConnectedControllers": fn(Iface, *mut u64) -> i32;
    controller_for_index = "SteamAPI_ISteamController_GetControllerForGamepadIndex": fn(Iface, i32) -> u64;
    controller_gamepad_index = "SteamAPI_ISteamController_GetGamepadIndexForController": fn(Iface, u64) -> i32;
    controller_set_handle = "SteamAPI_ISteamController_GetActionSetHandle": fn(Iface, *const c_char) -> u64;
    controller_activate_set = "SteamAPI_ISteamController_ActivateActionSet": fn(Iface, u64, u64);
    controller_current_set = "SteamAPI_ISteamController_GetCurrentActionSet": fn(Iface, u64) -> u64;
    controller_digital_handle = "SteamAPI_ISteamController_GetDigitalActionHandle": fn(Iface, *const c_char) -> u64;
    controller_digital_data = "SteamAPI_ISteamController_GetDigitalActionData": fn(Iface, u64, u64) -> DigitalActionDataRaw;
    controller_digital_origins = "SteamAPI_ISteamController_GetDigitalActionOrigins": fn(Iface, u64, u64, u64, *mut i32) -> i32;
    controller_analog_handle = "SteamAPI_ISteamController_GetAnalogActionHandle": fn(Iface, *const c_char) -> u64;
    controller_analog_data = "SteamAPI_ISteamController_GetAnalogActionData": fn(Iface, u64, u64) -> AnalogActionDataRaw;
    controller_analog_origins = "SteamAPI_ISteamController_GetAnalogActionOrigins": fn(Iface, u64, u64, u64, *mut i32) -> i32;
    controller_stop_momentum = "SteamAPI_ISteamController_StopAnalogActionMomentum": fn(Iface, u64, u64);
    controller_haptic = "SteamAPI_ISteamController_TriggerHapticPulse": fn(Iface, u64, i32, u16);
    controller_repeated_haptic = "SteamAPI_ISteamController_TriggerRepeatedHapticPulse": fn(Iface, u64, i32, u16, u16, u16, u32);
    controller_vibration = "SteamAPI_ISteamController_TriggerVibration": fn(Iface, u64, u16, u16);
    controller_led = "SteamAPI_ISteamController_SetLEDColor": fn(Iface, u64, u8, u8, u8, u32);
    controller_binding_panel = "SteamAPI_ISteamController_ShowBindingPanel": fn(Iface, u64) -> bool;
    controller_motion = "SteamAPI_ISteamController_GetMotionData": fn(Iface, u64) -> MotionDataRaw;
    controller_glyph = "SteamAPI_ISteamController_GetGlyphForActionOrigin": fn(Iface, i32) -> *const c_char;
    controller_origin_string = "SteamAPI_ISteamController_GetStringForActionOrigin": fn(Iface, i32) -> *const c_char;
}

// ---------------------------------------------------------------------------
// Message hook
// ---------------------------------------------------------------------------

/// The SDK's hook is a bare C function pointer with no user data, so the
/// installed closure has to live in a global.
static MESSAGE_HOOK: Mutex<Option<MessageHook>> = Mutex::new(None);

unsafe extern "C" fn forward_message(severity: i32, text: *const c_char) {
    if text.is_null() {
        return;
    }
    let hook = MESSAGE_HOOK.lock().unwrap_or_else(PoisonError::into_inner).clone();
    let Some(hook) = hook else {
        return;
    };
    // SAFETY: the SDK passes a NUL-terminated string valid for this call.
    let text = unsafe { CStr::from_ptr(text) }.to_string_lossy();
    let text = text.trim_end();
    // Unwinding into the SDK would abort the process.
    let delivered = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        hook(MessageSeverity::from_raw(severity), text);
    }));
    if delivered.is_err() {
        tracing::error!("SDK message hook panicked");
    }
}

/// Copies a string the SDK returned; null becomes empty.
///
/// # Safety
///
/// `raw` must be null or point to a NUL-terminated string.
unsafe fn sdk_string(raw: *const c_char) -> String {
    if raw.is_null() {
        return String::new();
    }
    // SAFETY: forwarded to the caller.
    unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned()
}

/// Resolves one symbol and copies the function pointer out of the library.
///
/// # Safety
///
/// `T` must be the exact function pointer type of the symbol.
unsafe fn symbol<T: Copy>(lib: &Library, name: &str) -> Result<T, NativeError> {
    let mut cname = Vec::with_capacity(name.len() + 1);
    cname.extend_from_slice(name.as_bytes());
    cname.push(0);
    // SAFETY: forwarded to the caller.
    let sym = unsafe { lib.get::<T>(cname.as_slice()) }
        .map_err(|_| NativeError::MissingSymbol(name.to_string()))?;
    Ok(*sym)
}

// ---------------------------------------------------------------------------
// SteamSdk
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Interfaces {
    user: AtomicPtr<c_void>,
    friends: AtomicPtr<c_void>,
    utils: AtomicPtr<c_void>,
    networking: AtomicPtr<c_void>,
    parental: AtomicPtr<c_void>,
    controller: AtomicPtr<c_void>,
}

/// The platform SDK, loaded from its shared library.
pub struct SteamSdk {
    api: FlatApi,
    ifaces: Interfaces,
    pipe: AtomicI32,
    /// Registered slot id to the callback type it listens for.
    slots: Mutex<HashMap<CallbackId, i32>>,
    next_slot: AtomicI32,
    /// Held while a thread walks the manual-dispatch pipe.
    dispatch: DispatchGate,
    // Declared last so it is dropped after everything holding its pointers.
    _lib: Library,
}

impl SteamSdk {
    /// File name of the SDK library on this platform.
    pub const LIBRARY_NAME: &'static str = if cfg!(windows) {
        "steam_api64.dll"
    } else if cfg!(target_os = "macos") {
        "libsteam_api.dylib"
    } else {
        "libsteam_api.so"
    };

    /// Loads the SDK from an explicit path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NativeError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading platform SDK");

        // SAFETY: loading a shared library runs its initializers. The SDK
        // library is trusted code shipped alongside the game.
        let lib = unsafe { Library::new(path) }.map_err(|e| NativeError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let api = FlatApi::resolve(&lib)?;

        tracing::info!(path = %path.display(), "platform SDK loaded");

        Ok(Self {
            api,
            ifaces: Interfaces::default(),
            pipe: AtomicI32::new(0),
            slots: Mutex::new(HashMap::new()),
            next_slot: AtomicI32::new(1),
            dispatch: DispatchGate::default(),
            _lib: lib,
        })
    }

    /// Loads the SDK by its platform file name, using the system's
    /// library search path.
    pub fn load_default() -> Result<Self, NativeError> {
        Self::load(Self::LIBRARY_NAME)
    }

    fn user(&self) -> Iface {
        self.ifaces.user.load(Ordering::Acquire)
    }

    fn friends(&self) -> Iface {
        self.ifaces.friends.load(Ordering::Acquire)
    }

    fn utils(&self) -> Iface {
        self.ifaces.utils.load(Ordering::Acquire)
    }

    fn networking(&self) -> Iface {
        self.ifaces.networking.load(Ordering::Acquire)
    }

    fn parental(&self) -> Iface {
        self.ifaces.parental.load(Ordering::Acquire)
    }

    fn controller(&self) -> Iface {
        self.ifaces.controller.load(Ordering::Acquire)
    }

    fn slots_for(&self, callback_type: i32) -> Vec<CallbackId> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .iter()
            .filter(|(_, ty)| **ty == callback_type)
            .map(|(id, _)| *id)
            .collect()
    }
}

// All `unsafe` blocks below call resolved SDK functions with the interface
// pointers the SDK handed out in `init`, and with buffers whose lengths
// are passed alongside them.
impl NativeApi for SteamSdk {
    fn init(&self) -> bool {
        let mut err = [0 as c_char; ERR_MSG_LEN];
        // SAFETY: manual dispatch must be selected before init; the error
        // buffer is the size the SDK expects.
        let result = unsafe {
            (self.api.manual_dispatch_init)();
            (self.api.init_flat)(err.as_mut_ptr())
        };
        if result != 0 {
            // SAFETY: the SDK NUL-terminates the message within the buffer.
            let msg = unsafe { CStr::from_ptr(err.as_ptr()) }.to_string_lossy();
            tracing::error!(code = result, message = %msg, "platform SDK init failed");
            return false;
        }

        // SAFETY: the accessors are valid after a successful init.
        unsafe {
            self.ifaces.user.store((self.api.user_iface)(), Ordering::Release);
            self.ifaces.friends.store((self.api.friends_iface)(), Ordering::Release);
            self.ifaces.utils.store((self.api.utils_iface)(), Ordering::Release);
            self.ifaces.networking.store((self.api.networking_iface)(), Ordering::Release);
            self.ifaces.parental.store((self.api.parental_iface)(), Ordering::Release);
            self.ifaces.controller.store((self.api.controller_iface)(), Ordering::Release);
            self.pipe.store((self.api.get_pipe)(), Ordering::Release);
        }
        true
    }

    fn is_steam_running(&self) -> bool {
        unsafe { (self.api.is_steam_running)() }
    }

    fn shutdown(&self) {
        self.pipe.store(0, Ordering::Release);
        for iface in [
            &self.ifaces.user,
            &self.ifaces.friends,
            &self.ifaces.utils,
            &self.ifaces.networking,
            &self.ifaces.parental,
            &self.ifaces.controller,
        ] {
            iface.store(ptr::null_mut(), Ordering::Release);
        }
        unsafe { (self.api.shutdown)() }
    }

    fn restart_app_if_necessary(&self, app_id: AppId) -> bool {
        unsafe { (self.api.restart_app_if_necessary)(app_id.0) }
    }

    fn release_current_thread_memory(&self) {
        unsafe { (self.api.release_current_thread_memory)() }
    }

    fn register_callback(&self, _payload_size: usize, callback_type: i32) -> CallbackId {
        let id = CallbackId::new(self.next_slot.fetch_add(1, Ordering::Relaxed));
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, callback_type);
        id
    }

    fn unregister_callback(&self, id: CallbackId) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    /// Concurrent pumps coalesce: if another thread is already walking the
    /// pipe, or a handler pumps from inside a dispatch, this returns at once.
    fn run_callbacks(&self, sink: &dyn CallbackSink) {
        let Some(_walking) = self.dispatch.try_enter() else {
            tracing::trace!("callback pipe busy, pump coalesced");
            return;
        };
        let pipe = self.pipe.load(Ordering::Acquire);
        if pipe == 0 {
            return;
        }

        unsafe { (self.api.manual_dispatch_run_frame)(pipe) };

        let mut msg = MaybeUninit::<CallbackMsg>::uninit();
        while unsafe { (self.api.manual_dispatch_next)(pipe, msg.as_mut_ptr()) } {
            // SAFETY: filled in by the SDK when it returns true.
            let msg = unsafe { msg.assume_init() };
            let (callback, param, param_len) = (msg.callback, msg.param, msg.param_len);

            let payload: &[u8] = if param.is_null() || param_len <= 0 {
                &[]
            } else {
                // SAFETY: the SDK owns this buffer until FreeLastCallback.
                unsafe { std::slice::from_raw_parts(param, param_len as usize) }
            };

            for id in self.slots_for(callback) {
                sink.dispatch(id, payload);
            }

            unsafe { (self.api.manual_dispatch_free)(pipe) };
        }
    }

    fn steam_id(&self) -> SteamId {
        SteamId(unsafe { (self.api.user_steam_id)(self.user()) })
    }

    fn begin_auth_session(&self, ticket: &[u8], steam_id: SteamId) -> BeginAuthSessionResult {
        let Ok(len) = i32::try_from(ticket.len()) else {
            return BeginAuthSessionResult::InvalidTicket;
        };
        let raw = unsafe {
            (self.api.user_begin_auth)(self.user(), ticket.as_ptr().cast(), len, steam_id.0)
        };
        BeginAuthSessionResult::from_raw(raw)
    }

    fn end_auth_session(&self, steam_id: SteamId) {
        unsafe { (self.api.user_end_auth)(self.user(), steam_id.0) }
    }

    fn get_auth_session_ticket(&self, buffer: &mut [u8]) -> (AuthTicketHandle, usize) {
        let cap = i32::try_from(buffer.len()).unwrap_or(i32::MAX);
        let mut written = 0u32;
        let handle = unsafe {
            (self.api.user_get_ticket)(
                self.user(),
                buffer.as_mut_ptr().cast(),
                cap,
                &mut written,
                ptr::null(),
            )
        };
        (AuthTicketHandle(handle), (written as usize).min(buffer.len()))
    }

    fn cancel_auth_ticket(&self, handle: AuthTicketHandle) {
        unsafe { (self.api.user_cancel_ticket)(self.user(), handle.0) }
    }

    fn user_has_license_for_app(&self, steam_id: SteamId, app_id: AppId) -> UserHasLicense {
        UserHasLicense::from_raw(unsafe {
            (self.api.user_has_license)(self.user(), steam_id.0, app_id.0)
        })
    }

    fn send_p2p_packet(&self, remote: SteamId, data: &[u8], send: P2PSend, channel: i32) -> bool {
        let Ok(len) = u32::try_from(data.len()) else {
            return false;
        };
        unsafe {
            (self.api.net_send)(
                self.networking(),
                remote.0,
                data.as_ptr().cast(),
                len,
                send.raw(),
                channel,
            )
        }
    }

    fn is_p2p_packet_available(&self, channel: i32) -> Option<u32> {
        let mut size = 0u32;
        unsafe { (self.api.net_available)(self.networking(), &mut size, channel) }.then_some(size)
    }

    fn read_p2p_packet(&self, buffer: &mut [u8], channel: i32) -> Option<(u32, SteamId)> {
        let cap = u32::try_from(buffer.len()).unwrap_or(u32::MAX);
        let mut size = 0u32;
        let mut remote = 0u64;
        let ok = unsafe {
            (self.api.net_read)(
                self.networking(),
                buffer.as_mut_ptr().cast(),
                cap,
                &mut size,
                &mut remote,
                channel,
            )
        };
        ok.then_some((size, SteamId(remote)))
    }

    fn accept_p2p_session(&self, remote: SteamId) -> bool {
        unsafe { (self.api.net_accept)(self.networking(), remote.0) }
    }

    fn close_p2p_session(&self, remote: SteamId) -> bool {
        unsafe { (self.api.net_close_session)(self.networking(), remote.0) }
    }

    fn close_p2p_channel(&self, remote: SteamId, channel: i32) -> bool {
        unsafe { (self.api.net_close_channel)(self.networking(), remote.0, channel) }
    }

    fn p2p_session_state(&self, remote: SteamId) -> Option<P2PSessionStateRaw> {
        let mut state = P2PSessionStateRaw::default();
        unsafe { (self.api.net_session_state)(self.networking(), remote.0, &mut state) }
            .then_some(state)
    }

    fn allow_p2p_packet_relay(&self, allow: bool) -> bool {
        unsafe { (self.api.net_allow_relay)(self.networking(), allow) }
    }

    fn start_voice_recording(&self) {
        unsafe { (self.api.user_start_voice)(self.user()) }
    }

    fn stop_voice_recording(&self) {
        unsafe { (self.api.user_stop_voice)(self.user()) }
    }

    fn available_voice(&self) -> (VoiceResult, u32) {
        let mut available = 0u32;
        let raw = unsafe {
            (self.api.user_available_voice)(self.user(), &mut available, ptr::null_mut(), 0)
        };
        (VoiceResult::from_raw(raw), available)
    }

    fn get_voice(&self, buffer: &mut [u8]) -> (VoiceResult, u32) {
        let cap = u32::try_from(buffer.len()).unwrap_or(u32::MAX);
        let mut written = 0u32;
        let raw = unsafe {
            (self.api.user_get_voice)(
                self.user(),
                true,
                buffer.as_mut_ptr().cast(),
                cap,
                &mut written,
                false,
                ptr::null_mut(),
                0,
                ptr::null_mut(),
                0,
            )
        };
        (VoiceResult::from_raw(raw), written)
    }

    fn decompress_voice(&self, compressed: &[u8], out: &mut [u8], sample_rate: u32) -> (VoiceResult, u32) {
        let in_len = u32::try_from(compressed.len()).unwrap_or(u32::MAX);
        let out_cap = u32::try_from(out.len()).unwrap_or(u32::MAX);
        let mut written = 0u32;
        let raw = unsafe {
            (self.api.user_decompress_voice)(
                self.user(),
                compressed.as_ptr().cast(),
                in_len,
                out.as_mut_ptr().cast(),
                out_cap,
                &mut written,
                sample_rate,
            )
        };
        (VoiceResult::from_raw(raw), written)
    }

    fn voice_optimal_sample_rate(&self) -> u32 {
        unsafe { (self.api.user_voice_sample_rate)(self.user()) }
    }

    fn set_in_game_voice_speaking(&self, speaking: bool) {
        // The SDK ignores the user argument and always applies to the local user.
        unsafe { (self.api.friends_voice_speaking)(self.friends(), 0, speaking) }
    }

    fn app_id(&self) -> AppId {
        AppId(unsafe { (self.api.utils_app_id)(self.utils()) })
    }

    fn ip_country(&self) -> String {
        unsafe { sdk_string((self.api.utils_ip_country)(self.utils())) }
    }

    fn current_battery_power(&self) -> u8 {
        unsafe { (self.api.utils_battery)(self.utils()) }
    }

    fn seconds_since_app_active(&self) -> u32 {
        unsafe { (self.api.utils_app_active)(self.utils()) }
    }

    fn seconds_since_computer_active(&self) -> u32 {
        unsafe { (self.api.utils_computer_active)(self.utils()) }
    }

    fn server_real_time(&self) -> u32 {
        unsafe { (self.api.utils_server_time)(self.utils()) }
    }

    fn is_overlay_enabled(&self) -> bool {
        unsafe { (self.api.utils_overlay_enabled)(self.utils()) }
    }

    fn overlay_needs_present(&self) -> bool {
        unsafe { (self.api.utils_overlay_present)(self.utils()) }
    }

    fn is_steam_in_big_picture_mode(&self) -> bool {
        unsafe { (self.api.utils_big_picture)(self.utils()) }
    }

    fn set_overlay_notification_position(&self, position: NotificationPosition) {
        unsafe { (self.api.utils_notification_position)(self.utils(), position.raw()) }
    }

    fn set_overlay_notification_inset(&self, horizontal: i32, vertical: i32) {
        unsafe { (self.api.utils_notification_inset)(self.utils(), horizontal, vertical) }
    }

    fn show_gamepad_text_input(
        &self,
        mode: GamepadTextInputMode,
        line_mode: GamepadTextLineMode,
        description: &str,
        max_chars: u32,
        existing_text: &str,
    ) -> bool {
        let (Ok(description), Ok(existing)) = (CString::new(description), CString::new(existing_text))
        else {
            return false;
        };
        unsafe {
            (self.api.utils_show_text_input)(
                self.utils(),
                mode.raw(),
                line_mode.raw(),
                description.as_ptr(),
                max_chars,
                existing.as_ptr(),
            )
        }
    }

    fn entered_gamepad_text(&self, length: u32) -> Option<String> {
        let mut buf = vec![0 as c_char; length as usize + 1];
        let cap = u32::try_from(buf.len()).unwrap_or(u32::MAX);
        if !unsafe { (self.api.utils_entered_text)(self.utils(), buf.as_mut_ptr(), cap) } {
            return None;
        }
        // Last byte was zeroed above and the SDK writes at most `cap` bytes.
        // SAFETY: the buffer is NUL-terminated.
        let text = unsafe { CStr::from_ptr(buf.as_ptr()) };
        Some(text.to_string_lossy().into_owned())
    }

    fn is_parental_lock_enabled(&self) -> bool {
        unsafe { (self.api.parental_lock_enabled)(self.parental()) }
    }

    fn is_parental_lock_locked(&self) -> bool {
        unsafe { (self.api.parental_lock_locked)(self.parental()) }
    }

    fn is_app_blocked(&self, app_id: AppId) -> bool {
        unsafe { (self.api.parental_app_blocked)(self.parental(), app_id.0) }
    }

    fn is_app_in_block_list(&self, app_id: AppId) -> bool {
        unsafe { (self.api.parental_app_in_list)(self.parental(), app_id.0) }
    }

    fn is_feature_blocked(&self, feature: ParentalFeature) -> bool {
        unsafe { (self.api.parental_feature_blocked)(self.parental(), feature.raw()) }
    }

    fn is_feature_in_block_list(&self, feature: ParentalFeature) -> bool {
        unsafe { (self.api.parental_feature_in_list)(self.parental(), feature.raw()) }
    }

    fn set_message_hook(&self, hook: Option<MessageHook>) {
        let install = hook.is_some();
        *MESSAGE_HOOK.lock().unwrap_or_else(PoisonError::into_inner) = hook;
        let forward: Option<WarningHook> = install.then_some(forward_message as WarningHook);
        unsafe { (self.api.utils_set_warning_hook)(self.utils(), forward) }
    }

    fn is_steam_running_in_vr(&self) -> bool {
        unsafe { (self.api.utils_running_in_vr)(self.utils()) }
    }

    fn start_vr_dashboard(&self) {
        unsafe { (self.api.utils_start_vr_dashboard)(self.utils()) }
    }

    fn is_vr_headset_streaming_enabled(&self) -> bool {
        unsafe { (self.api.utils_vr_streaming)(self.utils()) }
    }

    fn set_vr_headset_streaming_enabled(&self, enabled: bool) {
        unsafe { (self.api.utils_set_vr_streaming)(self.utils(), enabled) }
    }

    fn controller_init(&self) -> bool {
        unsafe { (self.api.controller_init)(self.controller()) }
    }

    fn controller_shutdown(&self) -> bool {
        unsafe { (self.api.controller_shutdown)(self.controller()) }
    }

    fn controller_run_frame(&self) {
        unsafe { (self.api.controller_run_frame)(self.controller()) }
    }

    fn connected_controllers(&self) -> Vec<ControllerHandle> {
        let mut out = [0u64; MAX_CONTROLLERS];
        let count = unsafe { (self.api.controller_connected)(self.controller(), out.as_mut_ptr()) };
        let count = usize::try_from(count).unwrap_or(0).min(MAX_CONTROLLERS);
        out[..count].iter().map(|raw| ControllerHandle(*raw)).collect()
    }

    fn controller_for_gamepad_index(&self, index: i32) -> ControllerHandle {
        ControllerHandle(unsafe { (self.api.controller_for_index)(self.controller(), index) })
    }

    fn gamepad_index_for_controller(&self, controller: ControllerHandle) -> i32 {
        unsafe { (self.api.controller_gamepad_index)(self.controller(), controller.0) }
    }

    fn action_set_handle(&self, name: &str) -> ActionSetHandle {
        let Ok(name) = CString::new(name) else {
            return ActionSetHandle(0);
        };
        ActionSetHandle(unsafe { (self.api.controller_set_handle)(self.controller(), name.as_ptr()) })
    }

    fn activate_action_set(&self, controller: ControllerHandle, set: ActionSetHandle) {
        unsafe { (self.api.controller_activate_set)(self.controller(), controller.0, set.0) }
    }

    fn current_action_set(&self, controller: ControllerHandle) -> ActionSetHandle {
        ActionSetHandle(unsafe { (self.api.controller_current_set)(self.controller(), controller.0) })
    }

    fn digital_action_handle(&self, name: &str) -> DigitalActionHandle {
        let Ok(name) = CString::new(name) else {
            return DigitalActionHandle(0);
        };
        DigitalActionHandle(unsafe {
            (self.api.controller_digital_handle)(self.controller(), name.as_ptr())
        })
    }

    fn digital_action_data(&self, controller: ControllerHandle, action: DigitalActionHandle) -> DigitalActionDataRaw {
        unsafe { (self.api.controller_digital_data)(self.controller(), controller.0, action.0) }
    }

    fn digital_action_origins(
        &self,
        controller: ControllerHandle,
        set: ActionSetHandle,
        action: DigitalActionHandle,
    ) -> Vec<ActionOrigin> {
        let mut out = [0i32; MAX_ORIGINS];
        let count = unsafe {
            (self.api.controller_digital_origins)(self.controller(), controller.0, set.0, action.0, out.as_mut_ptr())
        };
        origins(&out, count)
    }

    fn analog_action_handle(&self, name: &str) -> AnalogActionHandle {
        let Ok(name) = CString::new(name) else {
            return AnalogActionHandle(0);
        };
        AnalogActionHandle(unsafe {
            (self.api.controller_analog_handle)(self.controller(), name.as_ptr())
        })
    }

    fn analog_action_data(&self, controller: ControllerHandle, action: AnalogActionHandle) -> AnalogActionDataRaw {
        unsafe { (self.api.controller_analog_data)(self.controller(), controller.0, action.0) }
    }

    fn analog_action_origins(
        &self,
        controller: ControllerHandle,
        set: ActionSetHandle,
        action: AnalogActionHandle,
    ) -> Vec<ActionOrigin> {
        let mut out = [0i32; MAX_ORIGINS];
        let count = unsafe {
            (self.api.controller_analog_origins)(self.controller(), controller.0, set.0, action.0, out.as_mut_ptr())
        };
        origins(&out, count)
    }

    fn stop_analog_action_momentum(&self, controller: ControllerHandle, action: AnalogActionHandle) {
        unsafe { (self.api.controller_stop_momentum)(self.controller(), controller.0, action.0) }
    }

    fn trigger_haptic_pulse(&self, controller: ControllerHandle, pad: ControllerPad, micros: u16) {
        unsafe { (self.api.controller_haptic)(self.controller(), controller.0, pad.raw(), micros) }
    }

    fn trigger_repeated_haptic_pulse(
        &self,
        controller: ControllerHandle,
        pad: ControllerPad,
        on_micros: u16,
        off_micros: u16,
        repeat: u16,
    ) {
        unsafe {
            (self.api.controller_repeated_haptic)(
                self.controller(),
                controller.0,
                pad.raw(),
                on_micros,
                off_micros,
                repeat,
                0,
            )
        }
    }

    fn trigger_vibration(&self, controller: ControllerHandle, left_speed: u16, right_speed: u16) {
        unsafe { (self.api.controller_vibration)(self.controller(), controller.0, left_speed, right_speed) }
    }

    fn set_led_color(&self, controller: ControllerHandle, rgb: [u8; 3], flag: LedFlag) {
        let [r, g, b] = rgb;
        unsafe { (self.api.controller_led)(self.controller(), controller.0, r, g, b, flag.raw()) }
    }

    fn show_binding_panel(&self, controller: ControllerHandle) -> bool {
        unsafe { (self.api.controller_binding_panel)(self.controller(), controller.0) }
    }

    fn motion_data(&self, controller: ControllerHandle) -> MotionDataRaw {
        unsafe { (self.api.controller_motion)(self.controller(), controller.0) }
    }

    fn glyph_for_action_origin(&self, origin: ActionOrigin) -> String {
        unsafe { sdk_string((self.api.controller_glyph)(self.controller(), origin.0)) }
    }

    fn string_for_action_origin(&self, origin: ActionOrigin) -> String {
        unsafe { sdk_string((self.api.controller_origin_string)(self.controller(), origin.0)) }
    }
}

fn origins(raw: &[i32; MAX_ORIGINS], count: i32) -> Vec<ActionOrigin> {
    let count = usize::try_from(count).unwrap_or(0).min(MAX_ORIGINS);
    raw[..count].iter().map(|o| ActionOrigin(*o)).collect()
}
