use std::fmt;
use std::sync::Arc;

use tracing::debug;
use vapor_native::{AuthTicketHandle, NativeApi};

/// A ticket proving the local user's identity, for sending to a peer.
///
/// The ticket stays valid until it is cancelled, either explicitly with
/// [`cancel`](Self::cancel) or by dropping it. Keep it alive for as long
/// as the peer's session with this user should last.
pub struct AuthTicket {
    native: Arc<dyn NativeApi>,
    handle: AuthTicketHandle,
    bytes: Vec<u8>,
}

impl AuthTicket {
    pub(crate) fn new(native: Arc<dyn NativeApi>, handle: AuthTicketHandle, bytes: Vec<u8>) -> Self {
        debug!(handle = handle.0, len = bytes.len(), "auth ticket issued");
        Self { native, handle, bytes }
    }

    /// The ticket to hand to the peer.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn handle(&self) -> AuthTicketHandle {
        self.handle
    }

    /// Invalidates the ticket. Peers verifying it see
    /// [`SessionStatus::Canceled`](crate::SessionStatus::Canceled).
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for AuthTicket {
    fn drop(&mut self) {
        self.native.cancel_auth_ticket(self.handle);
        debug!(handle = self.handle.0, "auth ticket cancelled");
    }
}

impl fmt::Debug for AuthTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTicket")
            .field("handle", &self.handle)
            .field("len", &self.bytes.len())
            .finish()
    }
}
