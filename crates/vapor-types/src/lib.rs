//! Identity types shared by every Vapor crate.
//!
//! The platform identifies accounts, apps and games with packed integers.
//! This crate gives each of them a newtype so they can't be mixed up:
//!
//! - [`SteamId`]: a 64-bit account identity with embedded universe,
//!   account type, instance and account number.
//! - [`AppId`]: a numeric app identifier.
//! - [`GameId`]: an app, mod, or shortcut identifier.
//!
//! These types are pure values. Nothing in here talks to the native SDK,
//! so everything can be constructed and inspected in tests.

mod game_id;
mod steam_id;

pub use game_id::{AppId, GameId, GameIdType};
pub use steam_id::{AccountType, Instance, SteamId, Universe};
