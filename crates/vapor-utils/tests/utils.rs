use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant, UNIX_EPOCH};

use vapor_native::{
    FakeNative, GamepadTextInputDismissed, IpCountryChanged, LowBatteryPower, MessageSeverity,
    ParentalSettingsChanged, SteamShutdown,
};
use vapor_runtime::Context;
use vapor_types::AppId;
use vapor_utils::{NotificationPosition, ParentalFeature, ParentalSettings, TextInputRequest, Utils};

fn setup() -> (Arc<FakeNative>, Context, Utils) {
    let fake = Arc::new(FakeNative::new());
    let ctx = Context::new(fake.clone());
    let utils = Utils::new(ctx.clone());
    (fake, ctx, utils)
}

fn wait_for(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

// =========================================================================
// Queries
// =========================================================================

#[test]
fn test_battery_power_none_on_ac() {
    let (fake, _ctx, utils) = setup();
    assert_eq!(utils.battery_power(), None);

    fake.set_battery(42);
    assert_eq!(utils.battery_power(), Some(42));
}

#[test]
fn test_activity_durations() {
    let (fake, _ctx, utils) = setup();
    fake.set_activity(30, 5);

    assert_eq!(utils.since_app_active(), Duration::from_secs(30));
    assert_eq!(utils.since_computer_active(), Duration::from_secs(5));
}

#[test]
fn test_server_real_time_is_unix_seconds() {
    let (fake, _ctx, utils) = setup();
    fake.set_server_real_time(1_000);

    assert_eq!(utils.server_real_time(), UNIX_EPOCH + Duration::from_secs(1_000));
}

#[test]
fn test_app_and_country() {
    let (fake, _ctx, utils) = setup();
    assert_eq!(utils.app_id(), AppId(480));
    assert_eq!(utils.ip_country(), "US");

    fake.set_ip_country("NZ");
    assert_eq!(utils.ip_country(), "NZ");
}

#[test]
fn test_overlay_queries() {
    let (fake, _ctx, utils) = setup();
    fake.set_overlay(false, true);
    fake.set_big_picture(true);

    assert!(!utils.is_overlay_enabled());
    assert!(utils.overlay_needs_present());
    assert!(utils.is_big_picture_mode());
}

#[test]
fn test_notification_position_and_inset() {
    let (fake, _ctx, utils) = setup();
    utils.set_notification_position(NotificationPosition::TopLeft);
    utils.set_notification_inset(16, 8);

    assert_eq!(fake.notification_position(), NotificationPosition::TopLeft);
    assert_eq!(fake.notification_inset(), (16, 8));
}

// =========================================================================
// Notifications
// =========================================================================

#[test]
fn test_on_low_battery_reports_minutes() {
    let (fake, ctx, utils) = setup();
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _reg = utils.on_low_battery(move |left| sink.lock().unwrap().push(left));

    fake.push_callback(LowBatteryPower::new(9));
    ctx.run_callbacks();

    assert_eq!(*seen.lock().unwrap(), vec![Duration::from_secs(9 * 60)]);
}

#[test]
fn test_on_ip_country_changed_and_shutdown() {
    let (fake, ctx, utils) = setup();
    let count = Arc::new(AtomicUsize::new(0));
    let c1 = Arc::clone(&count);
    let c2 = Arc::clone(&count);
    let _country = utils.on_ip_country_changed(move || {
        c1.fetch_add(1, Ordering::SeqCst);
    });
    let _shutdown = utils.on_steam_shutdown(move || {
        c2.fetch_add(10, Ordering::SeqCst);
    });

    fake.push_callback(IpCountryChanged::default());
    fake.push_callback(SteamShutdown::default());
    ctx.run_callbacks();

    assert_eq!(count.load(Ordering::SeqCst), 11);
}

// =========================================================================
// gamepad_text_input
// =========================================================================

#[test]
fn test_gamepad_text_input_unavailable_returns_none() {
    let (fake, _ctx, utils) = setup();
    fake.set_text_input_accepts(false);

    assert_eq!(utils.gamepad_text_input(&TextInputRequest::new("Name", 32)), None);
    assert_eq!(fake.text_input_shown(), vec!["Name".to_string()]);
    assert_eq!(fake.registered_callbacks(), 0);
}

#[test]
fn test_gamepad_text_input_submitted_returns_text() {
    let (fake, ctx, utils) = setup();
    fake.set_entered_text(Some("player one"));

    let waiter = thread::spawn(move || utils.gamepad_text_input(&TextInputRequest::new("Name", 32)));

    wait_for("keyboard", || !fake.text_input_shown().is_empty());
    fake.push_callback(GamepadTextInputDismissed::new(true, 10, AppId(480)));
    ctx.run_callbacks();

    assert_eq!(waiter.join().unwrap(), Some("player one".to_string()));
    assert_eq!(fake.registered_callbacks(), 0);
}

#[test]
fn test_gamepad_text_input_cancelled_returns_none() {
    let (fake, ctx, utils) = setup();
    fake.set_entered_text(Some("ignored"));

    let waiter = thread::spawn(move || utils.gamepad_text_input(&TextInputRequest::new("Name", 32)));

    wait_for("keyboard", || !fake.text_input_shown().is_empty());
    fake.push_callback(GamepadTextInputDismissed::new(false, 0, AppId(480)));
    ctx.run_callbacks();

    assert_eq!(waiter.join().unwrap(), None);
}

// =========================================================================
// ParentalSettings
// =========================================================================

#[test]
fn test_parental_lock_and_blocks() {
    let (fake, ctx, _utils) = setup();
    let parental = ParentalSettings::new(ctx);
    fake.set_parental_lock(true, false);
    fake.block_app(AppId(570), true);
    fake.block_feature(ParentalFeature::Store, false);

    assert!(parental.is_lock_enabled());
    assert!(!parental.is_lock_locked());
    assert!(parental.is_app_blocked(AppId(570)));
    assert!(parental.is_app_in_block_list(AppId(570)));
    assert!(!parental.is_app_blocked(AppId(440)));
    assert!(parental.is_feature_blocked(ParentalFeature::Store));
    assert!(!parental.is_feature_in_block_list(ParentalFeature::Store));
}

#[test]
fn test_parental_on_changed() {
    let (fake, ctx, _utils) = setup();
    let parental = ParentalSettings::new(ctx.clone());
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let reg = parental.on_changed(move || {
        c.fetch_add(1, Ordering::SeqCst);
    });

    fake.push_callback(ParentalSettingsChanged::default());
    ctx.run_callbacks();
    reg.unregister();
    fake.push_callback(ParentalSettingsChanged::default());
    ctx.run_callbacks();

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

// =========================================================================
// SDK messages
// =========================================================================

#[test]
fn test_on_warning_message_receives_warnings_only() {
    let (fake, _ctx, utils) = setup();
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    let _reg = utils.on_warning_message(move |text| sink.lock().unwrap().push(text.to_string()));

    fake.emit_message(MessageSeverity::Debug, "noise");
    fake.emit_message(MessageSeverity::Warning, "callback slot leaked");

    assert_eq!(*lines.lock().unwrap(), vec!["callback slot leaked"]);
}

#[test]
fn test_debug_and_warning_hooks_share_native_hook() {
    let (fake, ctx, utils) = setup();
    let debugs = Arc::new(AtomicUsize::new(0));
    let warnings = Arc::new(AtomicUsize::new(0));

    let d = debugs.clone();
    let _debug = utils.on_debug_message(move |_| {
        d.fetch_add(1, Ordering::SeqCst);
    });
    let w = warnings.clone();
    let warning = utils.on_warning_message(move |_| {
        w.fetch_add(1, Ordering::SeqCst);
    });
    assert!(fake.has_message_hook());
    assert_eq!(ctx.message_hooks().len(), 2);

    fake.emit_message(MessageSeverity::Debug, "a");
    fake.emit_message(MessageSeverity::Warning, "b");
    warning.unregister();
    fake.emit_message(MessageSeverity::Warning, "c");

    assert_eq!(debugs.load(Ordering::SeqCst), 1);
    assert_eq!(warnings.load(Ordering::SeqCst), 1);
}

#[test]
fn test_message_hooks_from_separate_utils_all_fire() {
    let (fake, ctx, first) = setup();
    let second = Utils::new(ctx.clone());
    let count = Arc::new(AtomicUsize::new(0));

    let c1 = count.clone();
    let _a = first.on_warning_message(move |_| {
        c1.fetch_add(1, Ordering::SeqCst);
    });
    let c2 = count.clone();
    let _b = second.on_warning_message(move |_| {
        c2.fetch_add(1, Ordering::SeqCst);
    });

    fake.emit_message(MessageSeverity::Warning, "once");
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

// =========================================================================
// VR
// =========================================================================

#[test]
fn test_vr_queries_follow_native_state() {
    let (fake, _ctx, utils) = setup();
    assert!(!utils.is_running_in_vr());

    fake.set_running_in_vr(true);
    assert!(utils.is_running_in_vr());
}

#[test]
fn test_start_vr_dashboard_reaches_native() {
    let (fake, _ctx, utils) = setup();
    utils.start_vr_dashboard();
    utils.start_vr_dashboard();

    assert_eq!(fake.vr_dashboard_starts(), 2);
}

#[test]
fn test_set_vr_headset_streaming_round_trips() {
    let (_fake, _ctx, utils) = setup();
    utils.set_vr_headset_streaming_enabled(true);
    assert!(utils.is_vr_headset_streaming_enabled());

    utils.set_vr_headset_streaming_enabled(false);
    assert!(!utils.is_vr_headset_streaming_enabled());
}
