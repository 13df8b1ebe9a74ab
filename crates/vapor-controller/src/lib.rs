//! Action-based controller input.
//!
//! Games describe their controls as named actions grouped into action
//! sets ("Menu", "Drive", ...), and players bind physical inputs to them in
//! the platform's configurator. This crate reads those actions back:
//!
//! 1. [`Controllers`] starts the subsystem, lists connected devices and
//!    resolves action and set names to handles
//! 2. [`Controller`] is one device: action state, origins, motion,
//!    haptics, vibration and the LED
//!
//! Input is refreshed by every callback pump; call
//! [`Controllers::run_frame`] between pumps for fresher data.

mod controllers;
mod data;
mod error;
mod haptics;

pub use controllers::{Controller, Controllers};
pub use data::{AnalogActionData, DigitalActionData, MotionData};
pub use error::ControllerError;
pub use vapor_native::{
    ActionOrigin, ActionSetHandle, AnalogActionHandle, ControllerHandle, ControllerPad,
    DigitalActionHandle, MAX_CONTROLLERS, MAX_ORIGINS, SourceMode,
};
