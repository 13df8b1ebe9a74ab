use std::net::{Ipv4Addr, SocketAddrV4};

use vapor_native::{P2PSend, P2PSessionStateRaw};
use vapor_types::SteamId;

use crate::P2PError;

/// Largest packet the unreliable send types accept.
pub const MAX_UNRELIABLE_PACKET: usize = 1200;

/// Largest packet the reliable send types accept.
pub const MAX_RELIABLE_PACKET: usize = 1 << 20;

/// Delivery guarantee for a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reliability {
    /// May be dropped or reordered. Up to one MTU. While the connection is
    /// still being set up, packets are batched until it is ready.
    Unreliable,
    /// Like `Unreliable`, but dropped outright if there is no live
    /// connection yet.
    UnreliableNoDelay,
    /// Ordered and retransmitted; large packets are fragmented and
    /// reassembled.
    #[default]
    Reliable,
    /// Reliable, with small sends coalesced for up to 200 ms. Any plain
    /// `Reliable` send flushes the buffer.
    ReliableWithBuffering,
}

impl Reliability {
    pub fn max_packet_size(self) -> usize {
        match self {
            Self::Unreliable | Self::UnreliableNoDelay => MAX_UNRELIABLE_PACKET,
            Self::Reliable | Self::ReliableWithBuffering => MAX_RELIABLE_PACKET,
        }
    }

    pub(crate) fn to_native(self) -> P2PSend {
        match self {
            Self::Unreliable => P2PSend::Unreliable,
            Self::UnreliableNoDelay => P2PSend::UnreliableNoDelay,
            Self::Reliable => P2PSend::Reliable,
            Self::ReliableWithBuffering => P2PSend::ReliableWithBuffering,
        }
    }
}

/// A received packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub data: Vec<u8>,
    pub sender: SteamId,
}

/// Snapshot of the transport state for one remote user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub last_error: Option<P2PError>,
    /// `None` until an address is known.
    pub remote_addr: Option<SocketAddrV4>,
    pub bytes_queued_for_send: usize,
    pub packets_queued_for_send: usize,
    pub connection_active: bool,
    pub connecting: bool,
    pub using_relay: bool,
}

impl From<P2PSessionStateRaw> for SessionState {
    fn from(raw: P2PSessionStateRaw) -> Self {
        let ip = Ipv4Addr::from(raw.remote_ip);
        let remote_addr = (!ip.is_unspecified()).then(|| SocketAddrV4::new(ip, raw.remote_port));
        Self {
            last_error: P2PError::from_raw(raw.session_error),
            remote_addr,
            bytes_queued_for_send: usize::try_from(raw.bytes_queued_for_send).unwrap_or(0),
            packets_queued_for_send: usize::try_from(raw.packets_queued_for_send).unwrap_or(0),
            connection_active: raw.connection_active != 0,
            connecting: raw.connecting != 0,
            using_relay: raw.using_relay != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_from_raw() {
        let raw = P2PSessionStateRaw {
            connection_active: 1,
            connecting: 0,
            session_error: 4,
            using_relay: 1,
            bytes_queued_for_send: 512,
            packets_queued_for_send: 3,
            remote_ip: u32::from(Ipv4Addr::new(192, 168, 1, 20)),
            remote_port: 27015,
        };
        let state = SessionState::from(raw);

        assert_eq!(state.last_error, Some(P2PError::Timeout));
        assert_eq!(
            state.remote_addr,
            Some(SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 20), 27015))
        );
        assert_eq!(state.bytes_queued_for_send, 512);
        assert_eq!(state.packets_queued_for_send, 3);
        assert!(state.connection_active);
        assert!(!state.connecting);
        assert!(state.using_relay);
    }

    #[test]
    fn test_session_state_unspecified_ip_is_none() {
        let state = SessionState::from(P2PSessionStateRaw::default());
        assert_eq!(state.remote_addr, None);
        assert_eq!(state.last_error, None);
    }

    #[test]
    fn test_max_packet_size_by_class() {
        assert_eq!(Reliability::Unreliable.max_packet_size(), 1200);
        assert_eq!(Reliability::UnreliableNoDelay.max_packet_size(), 1200);
        assert_eq!(Reliability::Reliable.max_packet_size(), 1 << 20);
        assert_eq!(Reliability::ReliableWithBuffering.max_packet_size(), 1 << 20);
    }
}
