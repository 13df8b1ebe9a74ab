use std::time::Duration;

use tracing::trace;
use vapor_native::{ControllerPad, LedFlag};

use crate::Controller;

/// Longest single pulse the SDK accepts, in microseconds.
const MAX_PULSE_MICROS: u16 = u16::MAX;

fn micros(duration: Duration) -> u16 {
    u16::try_from(duration.as_micros()).unwrap_or(MAX_PULSE_MICROS)
}

impl Controller {
    /// Plays one pulse on a trackpad's actuator. Durations past about 65
    /// milliseconds are clamped.
    pub fn haptic_pulse(&self, pad: ControllerPad, duration: Duration) {
        let micros = micros(duration);
        trace!(?pad, micros, "haptic pulse");
        let _guard = self.ctx.guard();
        self.ctx.native().trigger_haptic_pulse(self.handle, pad, micros);
    }

    /// Plays `repeat` pulses of `on` separated by `off`.
    pub fn repeated_haptic_pulse(&self, pad: ControllerPad, on: Duration, off: Duration, repeat: u16) {
        let _guard = self.ctx.guard();
        self.ctx
            .native()
            .trigger_repeated_haptic_pulse(self.handle, pad, micros(on), micros(off), repeat);
    }

    /// Rumble on controllers with vibration motors. Zero stops a motor.
    pub fn vibrate(&self, left_speed: u16, right_speed: u16) {
        let _guard = self.ctx.guard();
        self.ctx
            .native()
            .trigger_vibration(self.handle, left_speed, right_speed);
    }

    /// Sets the LED color on controllers that have one.
    pub fn set_led_color(&self, rgb: [u8; 3]) {
        let _guard = self.ctx.guard();
        self.ctx
            .native()
            .set_led_color(self.handle, rgb, LedFlag::SetColor);
    }

    /// Gives the LED back to the player's own color setting.
    pub fn restore_led_color(&self) {
        let _guard = self.ctx.guard();
        self.ctx
            .native()
            .set_led_color(self.handle, [0, 0, 0], LedFlag::RestoreUserDefault);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_micros_clamps_long_pulses() {
        assert_eq!(micros(Duration::from_micros(500)), 500);
        assert_eq!(micros(Duration::from_millis(65)), 65_000);
        assert_eq!(micros(Duration::from_secs(1)), u16::MAX);
    }
}
