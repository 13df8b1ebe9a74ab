use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};
use vapor_native::{NativeApi, P2PSessionConnectFail, P2PSessionRequest};
use vapor_runtime::{Context, Registration};
use vapor_types::SteamId;

use crate::{P2PError, Packet, Reliability, SendError, SessionState};

/// Peer-to-peer packet transport keyed by user identity.
///
/// Sessions open implicitly on the first send. Incoming session requests
/// are accepted through [`listen`](Self::listen).
///
/// # Concurrency
///
/// Sends go straight to the platform and may run on any number of
/// threads. Reads are a two-step exchange with the platform (ask for the
/// next packet's size, then read that many bytes), and the pair is
/// serialized through [`Context::lock_packet_reads`]. Because that lock
/// lives in the context, every `Networking` built from clones of the same
/// context shares it, so concurrent readers never split a pair.
#[derive(Clone)]
pub struct Networking {
    ctx: Context,
}

impl Networking {
    /// Creates a handle on the platform's P2P interface. Cheap; any number
    /// of handles may coexist on one context.
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Accepts incoming session requests for which `accept` returns true.
    ///
    /// Each listener decides on its own, so with several listeners a
    /// request is accepted if any of them says yes. Requests nobody
    /// accepts expire on the remote side.
    pub fn listen<F>(&self, accept: F) -> Registration
    where
        F: Fn(SteamId) -> bool + Send + Sync + 'static,
    {
        let native = Arc::clone(self.ctx.native());
        self.ctx.register(move |req: P2PSessionRequest| {
            let remote = req.remote();
            if accept(remote) {
                if native.accept_p2p_session(remote) {
                    debug!(remote = %remote, "P2P session accepted");
                } else {
                    warn!(remote = %remote, "P2P session request expired before it was accepted");
                }
            } else {
                trace!(remote = %remote, "P2P session request ignored");
            }
        })
    }

    /// Calls `f` whenever a session with a remote user fails.
    pub fn on_connect_fail<F>(&self, f: F) -> Registration
    where
        F: Fn(SteamId, P2PError) + Send + Sync + 'static,
    {
        self.ctx.register(move |fail: P2PSessionConnectFail| {
            let remote = fail.remote();
            match P2PError::from_raw(fail.session_error()) {
                Some(err) => {
                    debug!(remote = %remote, %err, "P2P session failed");
                    f(remote, err);
                }
                None => trace!(remote = %remote, "P2P connect-fail callback without an error code"),
            }
        })
    }

    /// Queues `data` for `remote` on `channel`.
    ///
    /// # Panics
    ///
    /// Panics if `data` is empty.
    pub fn send_packet(
        &self,
        remote: SteamId,
        data: &[u8],
        reliability: Reliability,
        channel: i32,
    ) -> Result<(), SendError> {
        assert!(!data.is_empty(), "vapor: cannot send an empty packet");

        let sent = {
            let _guard = self.ctx.guard();
            self.ctx
                .native()
                .send_p2p_packet(remote, data, reliability.to_native(), channel)
        };
        if sent {
            trace!(remote = %remote, len = data.len(), channel, "P2P packet queued");
            return Ok(());
        }

        let err = classify_send_failure(remote, data.len(), reliability);
        debug!(remote = %remote, len = data.len(), channel, %err, "P2P send failed");
        Err(err)
    }

    /// Takes the next packet waiting on `channel`, if any.
    ///
    /// The availability check and the read happen as one step, so
    /// concurrent readers each get a distinct packet, even through
    /// different `Networking` handles.
    ///
    /// # Panics
    ///
    /// Panics if the platform reports a packet as available and then fails
    /// to deliver it at the reported size.
    pub fn read_packet(&self, channel: i32) -> Option<Packet> {
        let _read = self.ctx.lock_packet_reads();
        let _guard = self.ctx.guard();
        let native = self.ctx.native();

        let size = native.is_p2p_packet_available(channel)?;
        let mut data = vec![0u8; size as usize];
        let Some((read, sender)) = native.read_p2p_packet(&mut data, channel) else {
            panic!("vapor: packet of {size} bytes on channel {channel} was reported available but could not be read");
        };
        assert_eq!(
            read, size,
            "vapor: packet size changed between availability check and read"
        );

        trace!(sender = %sender, len = size, channel, "P2P packet received");
        Some(Packet { data, sender })
    }

    /// Closes one channel with `remote`. The session itself closes once
    /// its last channel does. Returns false if there was nothing to close.
    pub fn close_channel(&self, remote: SteamId, channel: i32) -> bool {
        let _guard = self.ctx.guard();
        self.ctx.native().close_p2p_channel(remote, channel)
    }

    /// Closes the whole session with `remote`.
    pub fn close_all_channels(&self, remote: SteamId) -> bool {
        let _guard = self.ctx.guard();
        let closed = self.ctx.native().close_p2p_session(remote);
        if closed {
            debug!(remote = %remote, "P2P session closed");
        }
        closed
    }

    /// `None` if there is no session with `remote`.
    pub fn session_state(&self, remote: SteamId) -> Option<SessionState> {
        let _guard = self.ctx.guard();
        self.ctx.native().p2p_session_state(remote).map(SessionState::from)
    }

    /// Allows or forbids routing P2P traffic through relay servers when a
    /// direct connection cannot be made.
    pub fn set_allow_packet_relay(&self, allow: bool) -> bool {
        let _guard = self.ctx.guard();
        self.ctx.native().allow_p2p_packet_relay(allow)
    }
}

/// Works out why the platform refused a send. The platform only says no,
/// so the cause is reconstructed from what we know about the packet.
fn classify_send_failure(remote: SteamId, len: usize, reliability: Reliability) -> SendError {
    if !remote.is_valid() {
        return SendError::InvalidTarget;
    }
    let limit = reliability.max_packet_size();
    if len > limit {
        return SendError::TooLarge { len, limit };
    }
    SendError::BufferFull
}

impl fmt::Debug for Networking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Networking").field("ctx", &self.ctx).finish()
    }
}
