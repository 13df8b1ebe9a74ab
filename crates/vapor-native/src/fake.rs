//! In-process stand-in for the platform SDK.
//!
//! [`FakeNative`] keeps all of its state behind one mutex and exposes
//! setters for scripting results and inspectors for asserting on what the
//! binding asked for. Pending callbacks are queued with
//! [`push_callback`](FakeNative::push_callback) and delivered on the next
//! [`run_callbacks`](NativeApi::run_callbacks), outside the lock, so
//! handlers may call back into the fake.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use vapor_types::{AppId, SteamId};

use crate::dispatch::DispatchGate;
use crate::{
    ActionOrigin, ActionSetHandle, AnalogActionDataRaw, AnalogActionHandle,
    AuthTicketHandle, BeginAuthSessionResult, CallbackId, CallbackPayload,
    CallbackSink, ControllerHandle, ControllerPad, DigitalActionDataRaw,
    DigitalActionHandle, GamepadTextInputMode, GamepadTextLineMode, LedFlag,
    MAX_CONTROLLERS, MAX_ORIGINS, MessageHook, MessageSeverity, MotionDataRaw,
    NativeApi, NotificationPosition, P2PSend, P2PSessionStateRaw,
    ParentalFeature, UserHasLicense, VoiceResult, encode_payload,
};

/// One call to `send_p2p_packet`, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPacket {
    pub remote: SteamId,
    pub data: Vec<u8>,
    pub send: P2PSend,
    pub channel: i32,
}

/// One controller output the binding asked for, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerCommand {
    ActivateActionSet(ControllerHandle, ActionSetHandle),
    StopMomentum(ControllerHandle, AnalogActionHandle),
    HapticPulse {
        controller: ControllerHandle,
        pad: ControllerPad,
        micros: u16,
    },
    RepeatedHapticPulse {
        controller: ControllerHandle,
        pad: ControllerPad,
        on_micros: u16,
        off_micros: u16,
        repeat: u16,
    },
    Vibration {
        controller: ControllerHandle,
        left_speed: u16,
        right_speed: u16,
    },
    LedColor {
        controller: ControllerHandle,
        rgb: [u8; 3],
        flag: LedFlag,
    },
    ShowBindingPanel(ControllerHandle),
}

struct State {
    // lifecycle
    steam_running: bool,
    init_ok: bool,
    init_calls: usize,
    shutdown_calls: usize,
    restart_needed: bool,
    thread_memory_releases: usize,

    // callbacks
    next_slot: i32,
    /// slot -> callback type
    slots: HashMap<CallbackId, i32>,
    pending: VecDeque<(i32, Vec<u8>)>,
    run_calls: usize,

    // user
    steam_id: SteamId,
    begin_results: VecDeque<BeginAuthSessionResult>,
    begin_calls: usize,
    active_auth: HashSet<SteamId>,
    ended_auth: Vec<SteamId>,
    next_ticket: u32,
    ticket_bytes: Vec<u8>,
    cancelled_tickets: Vec<AuthTicketHandle>,
    licenses: HashMap<(SteamId, AppId), UserHasLicense>,

    // networking
    inbox: HashMap<i32, VecDeque<(SteamId, Vec<u8>)>>,
    fail_reads: bool,
    sent: Vec<SentPacket>,
    send_results: VecDeque<bool>,
    accepted: Vec<SteamId>,
    closed_sessions: Vec<SteamId>,
    closed_channels: Vec<(SteamId, i32)>,
    session_states: HashMap<SteamId, P2PSessionStateRaw>,
    relay_allowed: Option<bool>,

    // voice
    recording: bool,
    voice_pending: Vec<u8>,
    voice_result: Option<VoiceResult>,
    decompressed: Vec<i16>,
    decompress_result: Option<VoiceResult>,
    decompress_calls: usize,
    speaking: bool,
    sample_rate: u32,

    // utils
    app_id: AppId,
    ip_country: String,
    battery: u8,
    seconds_since_app_active: u32,
    seconds_since_computer_active: u32,
    server_real_time: u32,
    overlay_enabled: bool,
    overlay_needs_present: bool,
    big_picture: bool,
    notification_position: NotificationPosition,
    notification_inset: (i32, i32),
    text_input_accepts: bool,
    text_input_shown: Vec<String>,
    entered_text: Option<String>,
    message_hook: Option<MessageHook>,
    running_in_vr: bool,
    vr_dashboard_starts: usize,
    vr_streaming: bool,

    // parental
    lock_enabled: bool,
    lock_locked: bool,
    blocked_apps: HashSet<AppId>,
    listed_apps: HashSet<AppId>,
    blocked_features: HashSet<ParentalFeature>,
    listed_features: HashSet<ParentalFeature>,

    // controller
    controller_inits: usize,
    controller_shutdowns: usize,
    controller_frames: usize,
    controllers: Vec<ControllerHandle>,
    action_names: HashMap<String, u64>,
    current_sets: HashMap<ControllerHandle, ActionSetHandle>,
    digital: HashMap<(ControllerHandle, u64), DigitalActionDataRaw>,
    analog: HashMap<(ControllerHandle, u64), AnalogActionDataRaw>,
    origins: HashMap<(ControllerHandle, u64, u64), Vec<ActionOrigin>>,
    motion: HashMap<ControllerHandle, MotionDataRaw>,
    controller_commands: Vec<ControllerCommand>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            steam_running: true,
            init_ok: true,
            init_calls: 0,
            shutdown_calls: 0,
            restart_needed: false,
            thread_memory_releases: 0,
            next_slot: 1,
            slots: HashMap::new(),
            pending: VecDeque::new(),
            run_calls: 0,
            steam_id: SteamId(76_561_197_960_265_728),
            begin_results: VecDeque::new(),
            begin_calls: 0,
            active_auth: HashSet::new(),
            ended_auth: Vec::new(),
            next_ticket: 1,
            ticket_bytes: vec![0x14, 0x00, 0x00, 0x00, 0xde, 0xad, 0xbe, 0xef],
            cancelled_tickets: Vec::new(),
            licenses: HashMap::new(),
            inbox: HashMap::new(),
            fail_reads: false,
            sent: Vec::new(),
            send_results: VecDeque::new(),
            accepted: Vec::new(),
            closed_sessions: Vec::new(),
            closed_channels: Vec::new(),
            session_states: HashMap::new(),
            relay_allowed: None,
            recording: false,
            voice_pending: Vec::new(),
            voice_result: None,
            decompressed: Vec::new(),
            decompress_result: None,
            decompress_calls: 0,
            speaking: false,
            sample_rate: 24_000,
            app_id: AppId(480),
            ip_country: "US".to_string(),
            battery: 255,
            seconds_since_app_active: 0,
            seconds_since_computer_active: 0,
            server_real_time: 1_700_000_000,
            overlay_enabled: true,
            overlay_needs_present: false,
            big_picture: false,
            notification_position: NotificationPosition::default(),
            notification_inset: (0, 0),
            text_input_accepts: true,
            text_input_shown: Vec::new(),
            entered_text: None,
            message_hook: None,
            running_in_vr: false,
            vr_dashboard_starts: 0,
            vr_streaming: false,
            lock_enabled: false,
            lock_locked: false,
            blocked_apps: HashSet::new(),
            listed_apps: HashSet::new(),
            blocked_features: HashSet::new(),
            listed_features: HashSet::new(),
            controller_inits: 0,
            controller_shutdowns: 0,
            controller_frames: 0,
            controllers: Vec::new(),
            action_names: HashMap::new(),
            current_sets: HashMap::new(),
            digital: HashMap::new(),
            analog: HashMap::new(),
            origins: HashMap::new(),
            motion: HashMap::new(),
            controller_commands: Vec::new(),
        }
    }
}

/// A scriptable [`NativeApi`] that never leaves the process.
#[derive(Default)]
pub struct FakeNative {
    state: Mutex<State>,
    dispatch: DispatchGate,
}

impl FakeNative {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- Lifecycle --------------------------------------------------------

    pub fn set_steam_running(&self, running: bool) {
        self.state().steam_running = running;
    }

    /// Makes every later `init` fail.
    pub fn fail_init(&self) {
        self.state().init_ok = false;
    }

    pub fn set_restart_needed(&self, needed: bool) {
        self.state().restart_needed = needed;
    }

    pub fn init_calls(&self) -> usize {
        self.state().init_calls
    }

    pub fn shutdown_calls(&self) -> usize {
        self.state().shutdown_calls
    }

    pub fn thread_memory_releases(&self) -> usize {
        self.state().thread_memory_releases
    }

    // -- Callbacks --------------------------------------------------------

    /// Queues `payload` for delivery on the next `run_callbacks`.
    pub fn push_callback<T: CallbackPayload>(&self, payload: T) {
        self.push_raw(T::CALLBACK_TYPE, encode_payload(&payload));
    }

    /// Queues arbitrary bytes under `callback_type`, whatever their length.
    pub fn push_raw(&self, callback_type: i32, bytes: Vec<u8>) {
        self.state().pending.push_back((callback_type, bytes));
    }

    pub fn run_calls(&self) -> usize {
        self.state().run_calls
    }

    /// Number of live slots.
    pub fn registered_callbacks(&self) -> usize {
        self.state().slots.len()
    }

    /// Number of live slots for `callback_type`.
    pub fn registered_for(&self, callback_type: i32) -> usize {
        self.state()
            .slots
            .values()
            .filter(|ty| **ty == callback_type)
            .count()
    }

    pub fn is_registered(&self, id: CallbackId) -> bool {
        self.state().slots.contains_key(&id)
    }

    // -- User -------------------------------------------------------------

    pub fn set_steam_id(&self, id: SteamId) {
        self.state().steam_id = id;
    }

    /// Scripts the result of the next `begin_auth_session`. Unscripted
    /// calls return `DuplicateRequest` for an identity with an active
    /// session and `Ok` otherwise.
    pub fn script_begin_auth(&self, result: BeginAuthSessionResult) {
        self.state().begin_results.push_back(result);
    }

    pub fn begin_auth_calls(&self) -> usize {
        self.state().begin_calls
    }

    pub fn ended_auth_sessions(&self) -> Vec<SteamId> {
        self.state().ended_auth.clone()
    }

    pub fn is_auth_active(&self, id: SteamId) -> bool {
        self.state().active_auth.contains(&id)
    }

    pub fn set_ticket_bytes(&self, bytes: Vec<u8>) {
        self.state().ticket_bytes = bytes;
    }

    pub fn cancelled_tickets(&self) -> Vec<AuthTicketHandle> {
        self.state().cancelled_tickets.clone()
    }

    pub fn set_license(&self, user: SteamId, app: AppId, license: UserHasLicense) {
        self.state().licenses.insert((user, app), license);
    }

    // -- Networking -------------------------------------------------------

    /// Makes a packet from `sender` available on `channel`.
    pub fn deliver_packet(&self, sender: SteamId, channel: i32, data: Vec<u8>) {
        self.state()
            .inbox
            .entry(channel)
            .or_default()
            .push_back((sender, data));
    }

    /// Makes every read fail even when a packet is available.
    pub fn fail_reads(&self) {
        self.state().fail_reads = true;
    }

    /// Scripts the result of the next `send_p2p_packet`. Unscripted sends
    /// succeed.
    pub fn script_send(&self, ok: bool) {
        self.state().send_results.push_back(ok);
    }

    pub fn sent_packets(&self) -> Vec<SentPacket> {
        self.state().sent.clone()
    }

    pub fn accepted_sessions(&self) -> Vec<SteamId> {
        self.state().accepted.clone()
    }

    pub fn closed_sessions(&self) -> Vec<SteamId> {
        self.state().closed_sessions.clone()
    }

    pub fn closed_channels(&self) -> Vec<(SteamId, i32)> {
        self.state().closed_channels.clone()
    }

    pub fn set_session_state(&self, remote: SteamId, state: P2PSessionStateRaw) {
        self.state().session_states.insert(remote, state);
    }

    pub fn relay_allowed(&self) -> Option<bool> {
        self.state().relay_allowed
    }

    // -- Voice ------------------------------------------------------------

    pub fn is_recording(&self) -> bool {
        self.state().recording
    }

    /// Compressed bytes the next `get_voice` hands out.
    pub fn set_captured_voice(&self, bytes: Vec<u8>) {
        self.state().voice_pending = bytes;
    }

    /// Overrides the result of `available_voice` and `get_voice`.
    pub fn set_voice_result(&self, result: Option<VoiceResult>) {
        self.state().voice_result = result;
    }

    /// Samples `decompress_voice` produces for any input.
    pub fn set_decompressed(&self, samples: Vec<i16>) {
        self.state().decompressed = samples;
    }

    /// Overrides the result of `decompress_voice`. The samples set with
    /// [`set_decompressed`](Self::set_decompressed) are still written, as
    /// far as they fit.
    pub fn set_decompress_result(&self, result: Option<VoiceResult>) {
        self.state().decompress_result = result;
    }

    pub fn decompress_calls(&self) -> usize {
        self.state().decompress_calls
    }

    pub fn is_speaking(&self) -> bool {
        self.state().speaking
    }

    pub fn set_optimal_sample_rate(&self, rate: u32) {
        self.state().sample_rate = rate;
    }

    // -- Utils ------------------------------------------------------------

    pub fn set_app_id(&self, app_id: AppId) {
        self.state().app_id = app_id;
    }

    pub fn set_ip_country(&self, country: &str) {
        self.state().ip_country = country.to_string();
    }

    pub fn set_battery(&self, percent: u8) {
        self.state().battery = percent;
    }

    pub fn set_activity(&self, app_active: u32, computer_active: u32) {
        let mut state = self.state();
        state.seconds_since_app_active = app_active;
        state.seconds_since_computer_active = computer_active;
    }

    pub fn set_server_real_time(&self, unix_seconds: u32) {
        self.state().server_real_time = unix_seconds;
    }

    pub fn set_overlay(&self, enabled: bool, needs_present: bool) {
        let mut state = self.state();
        state.overlay_enabled = enabled;
        state.overlay_needs_present = needs_present;
    }

    pub fn set_big_picture(&self, on: bool) {
        self.state().big_picture = on;
    }

    pub fn notification_position(&self) -> NotificationPosition {
        self.state().notification_position
    }

    pub fn notification_inset(&self) -> (i32, i32) {
        self.state().notification_inset
    }

    /// Whether the gamepad keyboard agrees to open.
    pub fn set_text_input_accepts(&self, accepts: bool) {
        self.state().text_input_accepts = accepts;
    }

    /// Descriptions of every keyboard the binding asked to open.
    pub fn text_input_shown(&self) -> Vec<String> {
        self.state().text_input_shown.clone()
    }

    pub fn set_entered_text(&self, text: Option<&str>) {
        self.state().entered_text = text.map(str::to_string);
    }

    /// Whether a message hook is installed.
    pub fn has_message_hook(&self) -> bool {
        self.state().message_hook.is_some()
    }

    /// Prints `text` through the installed message hook, if any, as the
    /// SDK would. The hook runs outside the fake's lock.
    pub fn emit_message(&self, severity: MessageSeverity, text: &str) {
        let hook = self.state().message_hook.clone();
        if let Some(hook) = hook {
            hook(severity, text);
        }
    }

    pub fn set_running_in_vr(&self, on: bool) {
        self.state().running_in_vr = on;
    }

    pub fn vr_dashboard_starts(&self) -> usize {
        self.state().vr_dashboard_starts
    }

    // -- Parental ---------------------------------------------------------

    pub fn set_parental_lock(&self, enabled: bool, locked: bool) {
        let mut state = self.state();
        state.lock_enabled = enabled;
        state.lock_locked = locked;
    }

    /// Blocks `app_id`, listing it too when `listed`.
    pub fn block_app(&self, app_id: AppId, listed: bool) {
        let mut state = self.state();
        state.blocked_apps.insert(app_id);
        if listed {
            state.listed_apps.insert(app_id);
        }
    }

    pub fn block_feature(&self, feature: ParentalFeature, listed: bool) {
        let mut state = self.state();
        state.blocked_features.insert(feature);
        if listed {
            state.listed_features.insert(feature);
        }
    }
}

impl FakeNative {
    // -- Controller -------------------------------------------------------

    pub fn controller_inits(&self) -> usize {
        self.state().controller_inits
    }

    pub fn controller_shutdowns(&self) -> usize {
        self.state().controller_shutdowns
    }

    pub fn controller_frames(&self) -> usize {
        self.state().controller_frames
    }

    /// Plugs in a controller. More than sixteen are ignored, as by the SDK.
    pub fn connect_controller(&self, controller: ControllerHandle) {
        let mut state = self.state();
        if state.controllers.len() < MAX_CONTROLLERS && !state.controllers.contains(&controller) {
            state.controllers.push(controller);
        }
    }

    /// Makes `name` resolve to `handle` for every kind of action lookup.
    pub fn define_action(&self, name: &str, handle: u64) {
        self.state().action_names.insert(name.to_string(), handle);
    }

    pub fn set_digital_action(&self, controller: ControllerHandle, action: DigitalActionHandle, state: bool, active: bool) {
        self.state()
            .digital
            .insert((controller, action.0), DigitalActionDataRaw { state, active });
    }

    pub fn set_analog_action(&self, controller: ControllerHandle, action: AnalogActionHandle, data: AnalogActionDataRaw) {
        self.state().analog.insert((controller, action.0), data);
    }

    /// Origins reported for `action` in `set`; digital and analog actions
    /// share one table keyed by raw handle.
    pub fn set_action_origins(&self, controller: ControllerHandle, set: ActionSetHandle, action: u64, origins: Vec<ActionOrigin>) {
        self.state().origins.insert((controller, set.0, action), origins);
    }

    pub fn set_motion(&self, controller: ControllerHandle, data: MotionDataRaw) {
        self.state().motion.insert(controller, data);
    }

    pub fn controller_commands(&self) -> Vec<ControllerCommand> {
        self.state().controller_commands.clone()
    }

    fn command(&self, command: ControllerCommand) {
        self.state().controller_commands.push(command);
    }

    fn lookup(&self, name: &str) -> u64 {
        self.state().action_names.get(name).copied().unwrap_or(0)
    }

    fn origins_for(&self, controller: ControllerHandle, set: ActionSetHandle, action: u64) -> Vec<ActionOrigin> {
        let state = self.state();
        let mut origins = state
            .origins
            .get(&(controller, set.0, action))
            .cloned()
            .unwrap_or_default();
        origins.truncate(MAX_ORIGINS);
        origins
    }
}

impl NativeApi for FakeNative {
    fn init(&self) -> bool {
        let mut state = self.state();
        state.init_calls += 1;
        state.init_ok
    }

    fn is_steam_running(&self) -> bool {
        self.state().steam_running
    }

    fn shutdown(&self) {
        self.state().shutdown_calls += 1;
    }

    fn restart_app_if_necessary(&self, _app_id: AppId) -> bool {
        self.state().restart_needed
    }

    fn release_current_thread_memory(&self) {
        self.state().thread_memory_releases += 1;
    }

    fn register_callback(&self, _payload_size: usize, callback_type: i32) -> CallbackId {
        let mut state = self.state();
        let id = CallbackId::new(state.next_slot);
        state.next_slot += 1;
        state.slots.insert(id, callback_type);
        id
    }

    fn unregister_callback(&self, id: CallbackId) {
        self.state().slots.remove(&id);
    }

    fn run_callbacks(&self, sink: &dyn CallbackSink) {
        self.state().run_calls += 1;
        let Some(_walking) = self.dispatch.try_enter() else {
            return;
        };

        let batch: Vec<(Vec<CallbackId>, Vec<u8>)> = {
            let mut state = self.state();
            let pending: Vec<_> = state.pending.drain(..).collect();
            pending
                .into_iter()
                .map(|(callback_type, bytes)| {
                    let mut ids: Vec<CallbackId> = state
                        .slots
                        .iter()
                        .filter(|(_, ty)| **ty == callback_type)
                        .map(|(id, _)| *id)
                        .collect();
                    ids.sort();
                    (ids, bytes)
                })
                .collect()
        };

        for (ids, bytes) in batch {
            for id in ids {
                // A handler may have unregistered a later slot.
                let live = self.state().slots.contains_key(&id);
                if live {
                    sink.dispatch(id, &bytes);
                }
            }
        }
    }

    fn steam_id(&self) -> SteamId {
        self.state().steam_id
    }

    fn begin_auth_session(&self, _ticket: &[u8], steam_id: SteamId) -> BeginAuthSessionResult {
        let mut state = self.state();
        state.begin_calls += 1;
        let result = match state.begin_results.pop_front() {
            Some(scripted) => scripted,
            None if state.active_auth.contains(&steam_id) => {
                BeginAuthSessionResult::DuplicateRequest
            }
            None => BeginAuthSessionResult::Ok,
        };
        if result == BeginAuthSessionResult::Ok {
            state.active_auth.insert(steam_id);
        }
        result
    }

    fn end_auth_session(&self, steam_id: SteamId) {
        let mut state = self.state();
        state.active_auth.remove(&steam_id);
        state.ended_auth.push(steam_id);
    }

    fn get_auth_session_ticket(&self, buffer: &mut [u8]) -> (AuthTicketHandle, usize) {
        let mut state = self.state();
        if buffer.len() < state.ticket_bytes.len() {
            return (AuthTicketHandle::INVALID, 0);
        }
        let len = state.ticket_bytes.len();
        buffer[..len].copy_from_slice(&state.ticket_bytes);
        let handle = AuthTicketHandle(state.next_ticket);
        state.next_ticket += 1;
        (handle, len)
    }

    fn cancel_auth_ticket(&self, handle: AuthTicketHandle) {
        self.state().cancelled_tickets.push(handle);
    }

    fn user_has_license_for_app(&self, steam_id: SteamId, app_id: AppId) -> UserHasLicense {
        let state = self.state();
        match state.licenses.get(&(steam_id, app_id)) {
            Some(license) => *license,
            None if state.active_auth.contains(&steam_id) => UserHasLicense::DoesNotHaveLicense,
            None => UserHasLicense::NoAuth,
        }
    }

    fn send_p2p_packet(&self, remote: SteamId, data: &[u8], send: P2PSend, channel: i32) -> bool {
        let mut state = self.state();
        state.sent.push(SentPacket {
            remote,
            data: data.to_vec(),
            send,
            channel,
        });
        state.send_results.pop_front().unwrap_or(true)
    }

    fn is_p2p_packet_available(&self, channel: i32) -> Option<u32> {
        let state = self.state();
        let (_, data) = state.inbox.get(&channel)?.front()?;
        Some(data.len() as u32)
    }

    fn read_p2p_packet(&self, buffer: &mut [u8], channel: i32) -> Option<(u32, SteamId)> {
        let mut state = self.state();
        if state.fail_reads {
            return None;
        }
        let (sender, data) = state.inbox.get_mut(&channel)?.pop_front()?;
        let n = data.len().min(buffer.len());
        buffer[..n].copy_from_slice(&data[..n]);
        Some((n as u32, sender))
    }

    fn accept_p2p_session(&self, remote: SteamId) -> bool {
        self.state().accepted.push(remote);
        true
    }

    fn close_p2p_session(&self, remote: SteamId) -> bool {
        let mut state = self.state();
        state.closed_sessions.push(remote);
        state.session_states.remove(&remote).is_some()
    }

    fn close_p2p_channel(&self, remote: SteamId, channel: i32) -> bool {
        let mut state = self.state();
        state.closed_channels.push((remote, channel));
        state.session_states.contains_key(&remote)
    }

    fn p2p_session_state(&self, remote: SteamId) -> Option<P2PSessionStateRaw> {
        self.state().session_states.get(&remote).copied()
    }

    fn allow_p2p_packet_relay(&self, allow: bool) -> bool {
        self.state().relay_allowed = Some(allow);
        true
    }

    fn start_voice_recording(&self) {
        self.state().recording = true;
    }

    fn stop_voice_recording(&self) {
        self.state().recording = false;
    }

    fn available_voice(&self) -> (VoiceResult, u32) {
        let state = self.state();
        if let Some(result) = state.voice_result {
            return (result, 0);
        }
        if state.voice_pending.is_empty() {
            (VoiceResult::NoData, 0)
        } else {
            (VoiceResult::Ok, state.voice_pending.len() as u32)
        }
    }

    fn get_voice(&self, buffer: &mut [u8]) -> (VoiceResult, u32) {
        let mut state = self.state();
        if let Some(result) = state.voice_result {
            return (result, 0);
        }
        if state.voice_pending.is_empty() {
            return (VoiceResult::NoData, 0);
        }
        if buffer.len() < state.voice_pending.len() {
            return (VoiceResult::BufferTooSmall, 0);
        }
        let pending = std::mem::take(&mut state.voice_pending);
        buffer[..pending.len()].copy_from_slice(&pending);
        (VoiceResult::Ok, pending.len() as u32)
    }

    fn decompress_voice(&self, _compressed: &[u8], out: &mut [u8], _sample_rate: u32) -> (VoiceResult, u32) {
        let mut state = self.state();
        state.decompress_calls += 1;
        let required = state.decompressed.len() * 2;
        if state.decompress_result.is_none() && out.len() < required {
            return (VoiceResult::BufferTooSmall, 0);
        }
        // A scripted failure still writes whatever fits, like a decoder
        // that gives up partway through.
        let mut written = 0;
        for (chunk, sample) in out.chunks_exact_mut(2).zip(&state.decompressed) {
            chunk.copy_from_slice(&sample.to_ne_bytes());
            written += 2;
        }
        (state.decompress_result.unwrap_or(VoiceResult::Ok), written as u32)
    }

    fn voice_optimal_sample_rate(&self) -> u32 {
        self.state().sample_rate
    }

    fn set_in_game_voice_speaking(&self, speaking: bool) {
        self.state().speaking = speaking;
    }

    fn app_id(&self) -> AppId {
        self.state().app_id
    }

    fn ip_country(&self) -> String {
        self.state().ip_country.clone()
    }

    fn current_battery_power(&self) -> u8 {
        self.state().battery
    }

    fn seconds_since_app_active(&self) -> u32 {
        self.state().seconds_since_app_active
    }

    fn seconds_since_computer_active(&self) -> u32 {
        self.state().seconds_since_computer_active
    }

    fn server_real_time(&self) -> u32 {
        self.state().server_real_time
    }

    fn is_overlay_enabled(&self) -> bool {
        self.state().overlay_enabled
    }

    fn overlay_needs_present(&self) -> bool {
        self.state().overlay_needs_present
    }

    fn is_steam_in_big_picture_mode(&self) -> bool {
        self.state().big_picture
    }

    fn set_overlay_notification_position(&self, position: NotificationPosition) {
        self.state().notification_position = position;
    }

    fn set_overlay_notification_inset(&self, horizontal: i32, vertical: i32) {
        self.state().notification_inset = (horizontal, vertical);
    }

    fn show_gamepad_text_input(
        &self,
        _mode: GamepadTextInputMode,
        _line_mode: GamepadTextLineMode,
        description: &str,
        _max_chars: u32,
        _existing_text: &str,
    ) -> bool {
        let mut state = self.state();
        state.text_input_shown.push(description.to_string());
        state.text_input_accepts
    }

    fn entered_gamepad_text(&self, length: u32) -> Option<String> {
        let state = self.state();
        let text = state.entered_text.as_ref()?;
        let end = text.len().min(length as usize);
        text.get(..end).map(str::to_string)
    }

    fn is_parental_lock_enabled(&self) -> bool {
        self.state().lock_enabled
    }

    fn is_parental_lock_locked(&self) -> bool {
        self.state().lock_locked
    }

    fn is_app_blocked(&self, app_id: AppId) -> bool {
        self.state().blocked_apps.contains(&app_id)
    }

    fn is_app_in_block_list(&self, app_id: AppId) -> bool {
        self.state().listed_apps.contains(&app_id)
    }

    fn is_feature_blocked(&self, feature: ParentalFeature) -> bool {
        self.state().blocked_features.contains(&feature)
    }

    fn is_feature_in_block_list(&self, feature: ParentalFeature) -> bool {
        self.state().listed_features.contains(&feature)
    }

    fn set_message_hook(&self, hook: Option<MessageHook>) {
        self.state().message_hook = hook;
    }

    fn is_steam_running_in_vr(&self) -> bool {
        self.state().running_in_vr
    }

    fn start_vr_dashboard(&self) {
        self.state().vr_dashboard_starts += 1;
    }

    fn is_vr_headset_streaming_enabled(&self) -> bool {
        self.state().vr_streaming
    }

    fn set_vr_headset_streaming_enabled(&self, enabled: bool) {
        self.state().vr_streaming = enabled;
    }

    fn controller_init(&self) -> bool {
        self.state().controller_inits += 1;
        true
    }

    fn controller_shutdown(&self) -> bool {
        self.state().controller_shutdowns += 1;
        true
    }

    fn controller_run_frame(&self) {
        self.state().controller_frames += 1;
    }

    fn connected_controllers(&self) -> Vec<ControllerHandle> {
        self.state().controllers.clone()
    }

    fn controller_for_gamepad_index(&self, index: i32) -> ControllerHandle {
        let state = self.state();
        usize::try_from(index)
            .ok()
            .and_then(|i| state.controllers.get(i).copied())
            .unwrap_or_default()
    }

    fn gamepad_index_for_controller(&self, controller: ControllerHandle) -> i32 {
        self.state()
            .controllers
            .iter()
            .position(|c| *c == controller)
            .map_or(-1, |i| i as i32)
    }

    fn action_set_handle(&self, name: &str) -> ActionSetHandle {
        ActionSetHandle(self.lookup(name))
    }

    fn activate_action_set(&self, controller: ControllerHandle, set: ActionSetHandle) {
        let targets = if controller == ControllerHandle::ALL {
            self.state().controllers.clone()
        } else {
            vec![controller]
        };
        let mut state = self.state();
        for target in targets {
            state.current_sets.insert(target, set);
        }
        state
            .controller_commands
            .push(ControllerCommand::ActivateActionSet(controller, set));
    }

    fn current_action_set(&self, controller: ControllerHandle) -> ActionSetHandle {
        self.state()
            .current_sets
            .get(&controller)
            .copied()
            .unwrap_or_default()
    }

    fn digital_action_handle(&self, name: &str) -> DigitalActionHandle {
        DigitalActionHandle(self.lookup(name))
    }

    fn digital_action_data(&self, controller: ControllerHandle, action: DigitalActionHandle) -> DigitalActionDataRaw {
        self.state()
            .digital
            .get(&(controller, action.0))
            .copied()
            .unwrap_or_default()
    }

    fn digital_action_origins(
        &self,
        controller: ControllerHandle,
        set: ActionSetHandle,
        action: DigitalActionHandle,
    ) -> Vec<ActionOrigin> {
        self.origins_for(controller, set, action.0)
    }

    fn analog_action_handle(&self, name: &str) -> AnalogActionHandle {
        AnalogActionHandle(self.lookup(name))
    }

    fn analog_action_data(&self, controller: ControllerHandle, action: AnalogActionHandle) -> AnalogActionDataRaw {
        self.state()
            .analog
            .get(&(controller, action.0))
            .copied()
            .unwrap_or_default()
    }

    fn analog_action_origins(
        &self,
        controller: ControllerHandle,
        set: ActionSetHandle,
        action: AnalogActionHandle,
    ) -> Vec<ActionOrigin> {
        self.origins_for(controller, set, action.0)
    }

    fn stop_analog_action_momentum(&self, controller: ControllerHandle, action: AnalogActionHandle) {
        self.command(ControllerCommand::StopMomentum(controller, action));
    }

    fn trigger_haptic_pulse(&self, controller: ControllerHandle, pad: ControllerPad, micros: u16) {
        self.command(ControllerCommand::HapticPulse { controller, pad, micros });
    }

    fn trigger_repeated_haptic_pulse(
        &self,
        controller: ControllerHandle,
        pad: ControllerPad,
        on_micros: u16,
        off_micros: u16,
        repeat: u16,
    ) {
        self.command(ControllerCommand::RepeatedHapticPulse {
            controller,
            pad,
            on_micros,
            off_micros,
            repeat,
        });
    }

    fn trigger_vibration(&self, controller: ControllerHandle, left_speed: u16, right_speed: u16) {
        self.command(ControllerCommand::Vibration {
            controller,
            left_speed,
            right_speed,
        });
    }

    fn set_led_color(&self, controller: ControllerHandle, rgb: [u8; 3], flag: LedFlag) {
        self.command(ControllerCommand::LedColor { controller, rgb, flag });
    }

    fn show_binding_panel(&self, controller: ControllerHandle) -> bool {
        let connected = self.state().controllers.contains(&controller);
        self.command(ControllerCommand::ShowBindingPanel(controller));
        connected
    }

    fn motion_data(&self, controller: ControllerHandle) -> MotionDataRaw {
        self.state().motion.get(&controller).copied().unwrap_or_default()
    }

    fn glyph_for_action_origin(&self, origin: ActionOrigin) -> String {
        if origin == ActionOrigin::NONE {
            return String::new();
        }
        format!("glyphs/origin_{}.png", origin.0)
    }

    fn string_for_action_origin(&self, origin: ActionOrigin) -> String {
        format!("Origin {}", origin.0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{LowBatteryPower, P2PSessionRequest};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(CallbackId, Vec<u8>)>>);

    impl CallbackSink for Recorder {
        fn dispatch(&self, id: CallbackId, payload: &[u8]) {
            self.0.lock().unwrap().push((id, payload.to_vec()));
        }
    }

    #[test]
    fn test_run_callbacks_fans_out_by_type() {
        let fake = FakeNative::new();
        let a = fake.register_callback(8, P2PSessionRequest::CALLBACK_TYPE);
        let b = fake.register_callback(8, P2PSessionRequest::CALLBACK_TYPE);
        let _other = fake.register_callback(1, LowBatteryPower::CALLBACK_TYPE);

        fake.push_callback(P2PSessionRequest::new(SteamId(5)));
        let sink = Recorder::default();
        fake.run_callbacks(&sink);

        let got = sink.0.into_inner().unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].0, a);
        assert_eq!(got[1].0, b);
        assert_eq!(fake.run_calls(), 1);
    }

    #[test]
    fn test_run_callbacks_drains_queue() {
        let fake = FakeNative::new();
        fake.register_callback(1, LowBatteryPower::CALLBACK_TYPE);
        fake.push_callback(LowBatteryPower::new(3));

        let first = Recorder::default();
        fake.run_callbacks(&first);
        let second = Recorder::default();
        fake.run_callbacks(&second);

        assert_eq!(first.0.into_inner().unwrap().len(), 1);
        assert!(second.0.into_inner().unwrap().is_empty());
    }

    struct Reentrant<'a> {
        fake: &'a FakeNative,
        seen: Mutex<Vec<Vec<u8>>>,
    }

    impl CallbackSink for Reentrant<'_> {
        fn dispatch(&self, _id: CallbackId, payload: &[u8]) {
            self.seen.lock().unwrap().push(payload.to_vec());
            self.fake.push_callback(LowBatteryPower::new(payload[0] + 1));
            self.fake.run_callbacks(self);
        }
    }

    #[test]
    fn test_run_callbacks_reentrant_pump_coalesces() {
        let fake = FakeNative::new();
        fake.register_callback(1, LowBatteryPower::CALLBACK_TYPE);
        fake.push_callback(LowBatteryPower::new(1));
        let sink = Reentrant {
            fake: &fake,
            seen: Mutex::new(Vec::new()),
        };

        fake.run_callbacks(&sink);
        assert_eq!(*sink.seen.lock().unwrap(), vec![vec![1]]);
        assert_eq!(fake.run_calls(), 2);

        fake.run_callbacks(&sink);
        assert_eq!(*sink.seen.lock().unwrap(), vec![vec![1], vec![2]]);
    }

    #[test]
    fn test_begin_auth_duplicate_while_active() {
        let fake = FakeNative::new();
        let user = SteamId(1);
        assert_eq!(fake.begin_auth_session(&[1], user), BeginAuthSessionResult::Ok);
        assert_eq!(
            fake.begin_auth_session(&[1], user),
            BeginAuthSessionResult::DuplicateRequest
        );
        fake.end_auth_session(user);
        assert_eq!(fake.begin_auth_session(&[1], user), BeginAuthSessionResult::Ok);
    }

    #[test]
    fn test_decompress_requires_room_for_all_samples() {
        let fake = FakeNative::new();
        fake.set_decompressed(vec![1, -1, 300]);

        let mut small = [0u8; 4];
        assert_eq!(fake.decompress_voice(&[], &mut small, 0).0, VoiceResult::BufferTooSmall);

        let mut big = [0u8; 6];
        assert_eq!(fake.decompress_voice(&[], &mut big, 0), (VoiceResult::Ok, 6));
        assert_eq!(&big[4..6], &300i16.to_ne_bytes());
        assert_eq!(fake.decompress_calls(), 2);
    }
}
