use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use vapor_native::{FakeNative, SteamShutdown};
use vapor_pump::{CallbackPump, PumpConfig};
use vapor_runtime::Context;

fn setup() -> (Arc<FakeNative>, Context, CallbackPump) {
    let fake = Arc::new(FakeNative::new());
    let ctx = Context::new(fake.clone());
    let pump = CallbackPump::new(ctx.clone());
    (fake, ctx, pump)
}

/// Waits until `cond` holds, failing the test after two seconds.
fn wait_for(cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(1));
    }
}

// =========================================================================
// Background mode
// =========================================================================

#[test]
fn test_background_pump_calls_run_callbacks() {
    let (fake, _ctx, pump) = setup();
    pump.start(PumpConfig::background(Duration::from_millis(1))).unwrap();
    assert!(pump.is_running());

    wait_for(|| fake.run_calls() >= 3);
    pump.stop();
}

#[test]
fn test_stop_is_synchronous_no_pumps_after_return() {
    let (fake, _ctx, pump) = setup();
    pump.start(PumpConfig::background(Duration::from_micros(100))).unwrap();
    wait_for(|| fake.run_calls() >= 1);

    assert!(pump.stop());
    let after_stop = fake.run_calls();
    thread::sleep(Duration::from_millis(30));

    assert_eq!(fake.run_calls(), after_stop);
    assert!(!pump.is_running());
}

#[test]
fn test_stop_when_not_running_returns_false() {
    let (_fake, _ctx, pump) = setup();
    assert!(!pump.stop());
}

#[test]
fn test_start_twice_replaces_worker() {
    let (fake, _ctx, pump) = setup();
    pump.start(PumpConfig::background(Duration::from_millis(1))).unwrap();
    pump.start(PumpConfig::background(Duration::from_millis(1))).unwrap();
    assert!(pump.is_running());

    // A single stop must leave nothing pumping.
    pump.stop();
    let after_stop = fake.run_calls();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(fake.run_calls(), after_stop);
}

#[test]
fn test_handlers_run_on_pump_thread() {
    let (fake, ctx, pump) = setup();
    let seen = Arc::new(Mutex::new(None::<String>));
    let seen2 = seen.clone();

    let _reg = ctx.register(move |_: SteamShutdown| {
        *seen2.lock().unwrap() = thread::current().name().map(str::to_string);
    });
    fake.push_callback(SteamShutdown::default());

    pump.start(PumpConfig::default()).unwrap();
    wait_for(|| seen.lock().unwrap().is_some());
    pump.stop();

    assert_eq!(seen.lock().unwrap().as_deref(), Some("vapor-callbacks"));
}

#[test]
fn test_drop_stops_worker() {
    let (fake, _ctx, pump) = setup();
    pump.start(PumpConfig::default()).unwrap();
    wait_for(|| fake.run_calls() >= 1);

    drop(pump);
    let after_drop = fake.run_calls();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(fake.run_calls(), after_drop);
}

// =========================================================================
// Manual mode
// =========================================================================

#[test]
fn test_manual_mode_never_spawns() {
    let (fake, _ctx, pump) = setup();
    pump.start(PumpConfig::manual()).unwrap();
    assert!(!pump.is_running());

    thread::sleep(Duration::from_millis(10));
    assert_eq!(fake.run_calls(), 0);

    pump.run_once();
    assert_eq!(fake.run_calls(), 1);
}

#[test]
fn test_switch_to_manual_stops_background() {
    let (fake, _ctx, pump) = setup();
    pump.start(PumpConfig::default()).unwrap();
    wait_for(|| fake.run_calls() >= 1);

    pump.start(PumpConfig::manual()).unwrap();
    assert!(!pump.is_running());
    let after = fake.run_calls();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(fake.run_calls(), after);
}

#[test]
fn test_run_once_delivers_on_calling_thread() {
    let (fake, ctx, pump) = setup();
    let caller = thread::current().id();
    let seen = Arc::new(Mutex::new(None));
    let seen2 = seen.clone();

    let _reg = ctx.register(move |_: SteamShutdown| {
        *seen2.lock().unwrap() = Some(thread::current().id());
    });

    fake.push_callback(SteamShutdown::default());
    pump.run_once();

    assert_eq!(*seen.lock().unwrap(), Some(caller));
}

#[test]
fn test_run_once_from_handler_coalesces() {
    let (fake, ctx, pump) = setup();
    let pump = Arc::new(pump);
    let deliveries = Arc::new(AtomicUsize::new(0));

    let inner_pump = Arc::downgrade(&pump);
    let inner_fake = Arc::clone(&fake);
    let count = Arc::clone(&deliveries);
    let _reg = ctx.register(move |_: SteamShutdown| {
        count.fetch_add(1, Ordering::SeqCst);
        inner_fake.push_callback(SteamShutdown::default());
        if let Some(pump) = inner_pump.upgrade() {
            pump.run_once();
        }
    });

    fake.push_callback(SteamShutdown::default());
    pump.run_once();
    assert_eq!(deliveries.load(Ordering::SeqCst), 1);

    pump.run_once();
    assert_eq!(deliveries.load(Ordering::SeqCst), 2);
}
