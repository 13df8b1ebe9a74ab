//! # Vapor
//!
//! Safe, thread-aware bindings to the Steamworks platform SDK.
//!
//! The SDK reports everything asynchronous through callbacks that only
//! arrive when somebody pumps them. Vapor owns that pump, routes each
//! callback to the subsystem waiting for it and keeps the SDK's
//! thread-local state tidy.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vapor::prelude::*;
//!
//! # fn main() -> Result<(), VaporError> {
//! let client = Client::builder()
//!     .app_id(AppId(480))
//!     .pump(PumpConfig::default())
//!     .init_sdk()?;
//!
//! let _listener = client.networking().listen(|_remote| true);
//! while let Some(packet) = client.networking().read_packet(0) {
//!     println!("{} sent {} bytes", packet.sender, packet.data.len());
//! }
//! client.shutdown();
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;

pub use client::{Client, ClientBuilder, restart_app_if_necessary};
pub use config::ClientConfig;
pub use error::VaporError;

pub use vapor_auth as auth;
pub use vapor_controller as controller;
pub use vapor_native as native;
pub use vapor_net as net;
pub use vapor_pump as pump;
pub use vapor_runtime as runtime;
pub use vapor_types as types;
pub use vapor_utils as utils;
pub use vapor_voice as voice;

/// Common imports for applications.
pub mod prelude {
    pub use crate::{Client, ClientBuilder, ClientConfig, VaporError, restart_app_if_necessary};
    pub use vapor_auth::{AuthSession, AuthSessions, AuthTicket, SessionStatus};
    pub use vapor_controller::{Controller, ControllerError, Controllers};
    pub use vapor_net::{Networking, P2PError, Packet, Reliability, SendError};
    pub use vapor_pump::{PumpConfig, PumpMode};
    pub use vapor_runtime::Registration;
    pub use vapor_types::{AppId, SteamId};
    pub use vapor_utils::{ParentalSettings, TextInputRequest, Utils};
    pub use vapor_voice::{DecompressError, Voice, VoiceError};
}
