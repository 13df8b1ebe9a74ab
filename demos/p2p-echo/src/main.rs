use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vapor::native::{FakeNative, NativeApi, P2PSessionRequest};
use vapor::prelude::*;

const CHANNEL: i32 = 0;
const FRAME: Duration = Duration::from_millis(16);

// ---------------------------------------------------------------------------
// Echo
// ---------------------------------------------------------------------------

/// Sends every waiting packet on `channel` straight back to its sender.
/// Returns how many packets were echoed.
fn echo_pending(net: &Networking, channel: i32) -> usize {
    let mut echoed = 0;
    while let Some(packet) = net.read_packet(channel) {
        if packet.data.is_empty() {
            continue;
        }
        match net.send_packet(packet.sender, &packet.data, Reliability::Reliable, channel) {
            Ok(()) => echoed += 1,
            Err(err) if err.is_temporary() => {
                warn!(sender = %packet.sender, %err, "send buffer full, dropping echo");
            }
            Err(err) => warn!(sender = %packet.sender, %err, "echo failed"),
        }
    }
    echoed
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// An in-process SDK with a couple of peers already talking to us.
fn offline_native() -> Arc<dyn NativeApi> {
    let fake = Arc::new(FakeNative::new());
    let peer = SteamId(76_561_197_960_265_731);
    fake.push_callback(P2PSessionRequest::new(peer));
    fake.deliver_packet(peer, CHANNEL, b"hello".to_vec());
    fake.deliver_packet(peer, CHANNEL, b"are you there?".to_vec());
    fake
}

fn load_config(path: Option<&str>) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?),
        None => Ok(ClientConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let offline = args.iter().any(|a| a == "--offline");
    let config_path = args.iter().find(|a| !a.starts_with("--")).map(String::as_str);
    let config = load_config(config_path)?;

    let builder = Client::builder().config(config);
    let client = if offline {
        builder.init(offline_native())?
    } else {
        builder.init_sdk()?
    };
    info!(steam_id = %client.steam_id(), app_id = %client.app_id(), offline, "p2p echo running");

    let net = client.networking();
    let _listener = net.listen(|remote| {
        info!(%remote, "accepting session");
        true
    });
    let _failures = net.on_connect_fail(|remote, err| {
        warn!(%remote, %err, temporary = err.is_temporary(), "session failed");
    });

    let quit = Arc::new(AtomicBool::new(false));
    let quit_flag = Arc::clone(&quit);
    let _shutdown = client.utils().on_steam_shutdown(move || quit_flag.store(true, Ordering::SeqCst));

    let mut idle_frames = 0;
    while !quit.load(Ordering::SeqCst) {
        client.run_callbacks();
        if echo_pending(net, CHANNEL) > 0 {
            idle_frames = 0;
        } else {
            idle_frames += 1;
        }
        // Offline, nobody new will ever show up.
        if offline && idle_frames > 10 {
            break;
        }
        thread::sleep(FRAME);
    }

    client.shutdown();
    Ok(())
}
