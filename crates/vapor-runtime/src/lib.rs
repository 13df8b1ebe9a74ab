//! Runtime plumbing shared by every Vapor subsystem.
//!
//! This crate turns the native layer's raw callback slots into
//! closure-based handlers and provides the small concurrency primitives
//! the feature crates build on:
//!
//! 1. **Callback registry** ([`CallbackRegistry`], [`Registration`]):
//!    maps callback ids to handlers and dispatches inbound events
//! 2. **Thread-affinity guard** ([`ThreadGuard`]): releases the SDK's
//!    thread-local scratch memory when the outermost guard on a thread drops
//! 3. **Resettable once** ([`OnceGroup`], [`ResettableOnce`]): one-time
//!    subsystem setup that re-arms after a shutdown
//!
//! [`MessageHooks`] builds on the last two to share the SDK's single
//! diagnostic hook among any number of listeners.
//!
//! All of these are reached through a [`Context`], which is cloned into each
//! subsystem instead of living in a global.
//!
//! # How it fits in the stack
//!
//! ```text
//! vapor-auth / vapor-net / ...  ← register handlers, call native queries
//!     ↕
//! vapor-runtime (this crate)    ← registry, guard, once
//!     ↕
//! vapor-native                  ← NativeApi, payload layouts
//! ```

mod context;
mod error;
mod guard;
mod message;
mod once;
mod registry;

pub use context::Context;
pub use error::InitError;
pub use guard::ThreadGuard;
pub use message::MessageHooks;
pub use once::{OnceGroup, ResettableOnce, ShutdownHooks};
pub use registry::{CallbackRegistry, Registration};
