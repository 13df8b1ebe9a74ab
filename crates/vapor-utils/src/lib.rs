//! Miscellaneous platform services: machine state, the overlay, the
//! gamepad keyboard, SDK diagnostics, VR mode and parental settings.

mod parental;
mod text_input;
mod utils;
mod vr;

pub use parental::ParentalSettings;
pub use text_input::TextInputRequest;
pub use utils::Utils;
pub use vapor_native::{MessageSeverity, NotificationPosition, ParentalFeature};
