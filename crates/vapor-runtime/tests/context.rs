use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use vapor_native::{
    CallbackPayload, FakeNative, LowBatteryPower, MessageSeverity, P2PSessionRequest, SteamShutdown,
};
use vapor_runtime::{Context, InitError, ThreadGuard};
use vapor_types::SteamId;

fn setup() -> (Arc<FakeNative>, Context) {
    let fake = Arc::new(FakeNative::new());
    let ctx = Context::init(fake.clone()).expect("fake init succeeds");
    (fake, ctx)
}

fn counter() -> (Arc<AtomicUsize>, impl Fn(LowBatteryPower) + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    (count, move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    })
}

// =========================================================================
// Init
// =========================================================================

#[test]
fn test_init_client_not_running_returns_steam_not_running() {
    let fake = Arc::new(FakeNative::new());
    fake.fail_init();
    fake.set_steam_running(false);

    let err = Context::init(fake.clone()).unwrap_err();
    assert_eq!(err, InitError::SteamNotRunning);
}

#[test]
fn test_init_client_running_but_refused_returns_init_failed() {
    let fake = Arc::new(FakeNative::new());
    fake.fail_init();

    let err = Context::init(fake).unwrap_err();
    assert_eq!(err, InitError::InitFailed);
}

#[test]
fn test_init_releases_thread_memory() {
    let (fake, _ctx) = setup();
    assert_eq!(fake.init_calls(), 1);
    assert_eq!(fake.thread_memory_releases(), 1);
}

// =========================================================================
// Registration and dispatch
// =========================================================================

#[test]
fn test_run_callbacks_invokes_registered_handler() {
    let (fake, ctx) = setup();
    let (count, handler) = counter();
    let _reg = ctx.register(handler);

    fake.push_callback(LowBatteryPower::new(5));
    fake.push_callback(LowBatteryPower::new(4));
    ctx.run_callbacks();

    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unregister_then_dispatch_is_noop() {
    let (fake, ctx) = setup();
    let (count, handler) = counter();
    let reg = ctx.register(handler);

    fake.push_callback(LowBatteryPower::new(5));
    ctx.run_callbacks();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    reg.unregister();
    fake.push_callback(LowBatteryPower::new(5));
    ctx.run_callbacks();

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(fake.registered_callbacks(), 0);
}

#[test]
fn test_handlers_only_see_their_type() {
    let (fake, ctx) = setup();
    let (battery, handler) = counter();
    let _battery = ctx.register(handler);

    let shutdowns = Arc::new(AtomicUsize::new(0));
    let s = shutdowns.clone();
    let _shutdown = ctx.register(move |_: SteamShutdown| {
        s.fetch_add(1, Ordering::SeqCst);
    });

    fake.push_callback(SteamShutdown::default());
    fake.push_callback(P2PSessionRequest::new(SteamId(1)));
    ctx.run_callbacks();

    assert_eq!(battery.load(Ordering::SeqCst), 0);
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
}

#[test]
fn test_handler_may_register_during_dispatch() {
    let (fake, ctx) = setup();
    let late = Arc::new(std::sync::Mutex::new(Vec::new()));

    let ctx2 = ctx.clone();
    let late2 = late.clone();
    let _reg = ctx.register(move |_: SteamShutdown| {
        late2.lock().unwrap().push(ctx2.register(|_: LowBatteryPower| {}));
    });

    fake.push_callback(SteamShutdown::default());
    ctx.run_callbacks();

    assert_eq!(late.lock().unwrap().len(), 1);
    assert_eq!(fake.registered_for(LowBatteryPower::CALLBACK_TYPE), 1);
    late.lock().unwrap().clear();
}

#[test]
#[should_panic(expected = "payload size mismatch")]
fn test_run_callbacks_size_mismatch_panics() {
    let (fake, ctx) = setup();
    let _reg = ctx.register(|_: P2PSessionRequest| {});

    fake.push_raw(P2PSessionRequest::CALLBACK_TYPE, vec![0; 3]);
    ctx.run_callbacks();
}

#[test]
fn test_run_callbacks_holds_thread_guard() {
    let (fake, ctx) = setup();
    let depth = Arc::new(AtomicUsize::new(0));
    let d = depth.clone();
    let _reg = ctx.register(move |_: SteamShutdown| {
        d.store(ThreadGuard::depth(), Ordering::SeqCst);
    });

    fake.push_callback(SteamShutdown::default());
    ctx.run_callbacks();

    assert_eq!(depth.load(Ordering::SeqCst), 1);
    assert_eq!(ThreadGuard::depth(), 0);
}

// =========================================================================
// Once group
// =========================================================================

#[test]
fn test_once_hook_drops_lazy_registration_on_reset() {
    let (fake, ctx) = setup();
    let once = ctx.new_once();

    let ctx2 = ctx.clone();
    once.call_once(|hooks| {
        let reg = ctx2.register(|_: SteamShutdown| {});
        hooks.push(move || reg.unregister());
    });
    assert_eq!(fake.registered_for(SteamShutdown::CALLBACK_TYPE), 1);

    ctx.once_group().reset();
    assert_eq!(fake.registered_for(SteamShutdown::CALLBACK_TYPE), 0);
    assert!(!once.is_done());
}

// =========================================================================
// Message hooks
// =========================================================================

#[test]
fn test_message_hooks_shared_across_clones() {
    let (fake, ctx) = setup();
    let clone = ctx.clone();
    let seen = Arc::new(AtomicUsize::new(0));

    let s1 = seen.clone();
    let _a = ctx.register_message_hook(MessageSeverity::Warning, move |_| {
        s1.fetch_add(1, Ordering::SeqCst);
    });
    let s2 = seen.clone();
    let _b = clone.register_message_hook(MessageSeverity::Warning, move |_| {
        s2.fetch_add(1, Ordering::SeqCst);
    });

    fake.emit_message(MessageSeverity::Warning, "low disk");
    assert_eq!(seen.load(Ordering::SeqCst), 2);
    assert_eq!(ctx.message_hooks().len(), 2);
}

#[test]
fn test_once_group_reset_uninstalls_message_hook() {
    let (fake, ctx) = setup();
    let _reg = ctx.register_message_hook(MessageSeverity::Debug, |_| {});
    assert!(fake.has_message_hook());

    ctx.once_group().reset();
    assert!(!fake.has_message_hook());
}
