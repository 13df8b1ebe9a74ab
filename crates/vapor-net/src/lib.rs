//! Connectionless peer-to-peer packets addressed by user identity.
//!
//! Packets go out with [`Networking::send_packet`] and come in with
//! [`Networking::read_packet`], one call per packet. The platform handles
//! NAT traversal and falls back to relays unless
//! [`Networking::set_allow_packet_relay`] forbids it.

mod error;
mod networking;
mod packet;

pub use error::{P2PError, SendError};
pub use networking::Networking;
pub use packet::{MAX_RELIABLE_PACKET, MAX_UNRELIABLE_PACKET, Packet, Reliability, SessionState};
