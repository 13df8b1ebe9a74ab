//! Integration tests for client init, pumping and shutdown.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use vapor::native::{
    AuthSessionResponse, FakeNative, NativeApi, P2PSessionRequest, ValidateAuthTicketResponse, VoiceResult,
};
use vapor::prelude::*;
use vapor::runtime::InitError;

const TICKET: &[u8] = &[1, 2, 3, 4];
const PEER: SteamId = SteamId(76_561_197_960_265_777);

fn native(fake: &Arc<FakeNative>) -> Arc<dyn NativeApi> {
    fake.clone()
}

fn wait_for(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

// =========================================================================
// Init
// =========================================================================

#[test]
fn test_init_steam_not_running() {
    let fake = Arc::new(FakeNative::new());
    fake.fail_init();
    fake.set_steam_running(false);

    let err = Client::builder().init(native(&fake)).unwrap_err();
    assert!(matches!(err, VaporError::Init(InitError::SteamNotRunning)));
}

#[test]
fn test_init_failed_while_running() {
    let fake = Arc::new(FakeNative::new());
    fake.fail_init();

    let err = Client::builder().init(native(&fake)).unwrap_err();
    assert!(matches!(err, VaporError::Init(InitError::InitFailed)));
    assert_eq!(fake.init_calls(), 1);
}

#[test]
fn test_init_exposes_identity() {
    let fake = Arc::new(FakeNative::new());
    fake.set_steam_id(PEER);

    let client = Client::builder()
        .app_id(AppId(480))
        .pump(PumpConfig::manual())
        .init(native(&fake))
        .unwrap();

    assert_eq!(client.steam_id(), PEER);
    assert_eq!(client.app_id(), AppId(480));
    assert_eq!(client.pump_mode(), PumpMode::Manual);
    assert!(!client.pump().is_running());
}

#[test]
fn test_init_with_config_struct() {
    let fake = Arc::new(FakeNative::new());
    let config = ClientConfig {
        app_id: None,
        pump: PumpConfig::background(Duration::from_millis(2)),
    };

    let client = Client::builder().config(config).init(native(&fake)).unwrap();
    assert_eq!(client.pump_mode(), PumpMode::Background);
    assert!(client.pump().is_running());
}

// =========================================================================
// Pumping
// =========================================================================

#[test]
fn test_manual_mode_delivers_on_run_callbacks() {
    let fake = Arc::new(FakeNative::new());
    let client = Client::builder()
        .pump(PumpConfig::manual())
        .init(native(&fake))
        .unwrap();
    let _listener = client.networking().listen(|_| true);

    fake.push_callback(P2PSessionRequest::new(PEER));
    assert!(fake.accepted_sessions().is_empty());

    client.run_callbacks();
    assert_eq!(fake.accepted_sessions(), vec![PEER]);
}

#[test]
fn test_background_mode_delivers_without_help() {
    let fake = Arc::new(FakeNative::new());
    let client = Client::builder().init(native(&fake)).unwrap();
    let session = client.auth().begin_session(TICKET, PEER).unwrap();

    fake.push_callback(ValidateAuthTicketResponse::new(PEER, AuthSessionResponse::Ok, PEER));
    wait_for("verdict", || session.status() == SessionStatus::Ok);

    session.close().unwrap();
}

// =========================================================================
// Shutdown
// =========================================================================

#[test]
fn test_shutdown_stops_pump_and_drops_callbacks() {
    let fake = Arc::new(FakeNative::new());
    let client = Client::builder().init(native(&fake)).unwrap();
    let session = client.auth().begin_session(TICKET, PEER).unwrap();
    assert_eq!(fake.registered_callbacks(), 1);

    client.shutdown();

    assert_eq!(fake.shutdown_calls(), 1);
    assert_eq!(fake.registered_callbacks(), 0);

    let runs = fake.run_calls();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(fake.run_calls(), runs);

    session.close().unwrap();
}

#[test]
fn test_drop_shuts_down_once() {
    let fake = Arc::new(FakeNative::new());
    {
        let _client = Client::builder()
            .pump(PumpConfig::manual())
            .init(native(&fake))
            .unwrap();
    }
    assert_eq!(fake.shutdown_calls(), 1);
}

#[test]
fn test_leaked_sessions_counted_through_client() {
    let fake = Arc::new(FakeNative::new());
    let client = Client::builder()
        .pump(PumpConfig::manual())
        .init(native(&fake))
        .unwrap();

    drop(client.auth().begin_session(TICKET, PEER).unwrap());
    assert_eq!(client.auth().leaked_sessions(), 1);
}

#[test]
fn test_voice_decode_failure_lifts_into_vapor_error_with_samples() {
    let fake = Arc::new(FakeNative::new());
    let client = Client::builder()
        .pump(PumpConfig::manual())
        .init(native(&fake))
        .unwrap();
    fake.set_decompressed(vec![7, 8]);
    fake.set_decompress_result(Some(VoiceResult::DataCorrupted));

    let decode = || -> Result<Vec<i16>, VaporError> { Ok(client.voice().decompress(b"x", 24_000)?) };
    match decode() {
        Err(VaporError::Decompress(err)) => assert_eq!(err.partial(), &[7, 8]),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_shutdown_stops_started_controller_subsystem() {
    let fake = Arc::new(FakeNative::new());
    let client = Client::builder()
        .pump(PumpConfig::manual())
        .init(native(&fake))
        .unwrap();
    client.controllers().init().unwrap();

    client.shutdown();
    assert_eq!(fake.controller_shutdowns(), 1);
}

#[test]
fn test_shutdown_removes_sdk_message_hook() {
    let fake = Arc::new(FakeNative::new());
    let client = Client::builder()
        .pump(PumpConfig::manual())
        .init(native(&fake))
        .unwrap();
    let _reg = client.utils().on_warning_message(|_| {});
    assert!(fake.has_message_hook());

    client.shutdown();
    assert!(!fake.has_message_hook());
}

// =========================================================================
// restart_app_if_necessary
// =========================================================================

#[test]
fn test_restart_app_if_necessary_releases_thread_memory() {
    let fake = Arc::new(FakeNative::new());
    fake.set_restart_needed(true);

    assert!(restart_app_if_necessary(&native(&fake), AppId(480)));
    assert_eq!(fake.thread_memory_releases(), 1);
}

#[test]
fn test_restart_app_not_needed() {
    let fake = Arc::new(FakeNative::new());
    assert!(!restart_app_if_necessary(&native(&fake), AppId(480)));
}
