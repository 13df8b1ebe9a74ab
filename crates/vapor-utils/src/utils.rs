use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;
use vapor_native::{
    IpCountryChanged, LowBatteryPower, MessageSeverity, NotificationPosition, SteamShutdown,
};
use vapor_runtime::{Context, Registration};
use vapor_types::AppId;

/// Battery level reported while on AC power.
const ON_AC_POWER: u8 = 255;

/// Machine, session and overlay queries.
#[derive(Clone)]
pub struct Utils {
    pub(crate) ctx: Context,
}

impl Utils {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn app_id(&self) -> AppId {
        self.ctx.native().app_id()
    }

    /// Two-letter ISO 3166-1-alpha-2 country code, looked up from the
    /// user's IP address.
    pub fn ip_country(&self) -> String {
        self.ctx.native().ip_country()
    }

    /// Battery percentage from 0 to 100, or `None` on AC power.
    pub fn battery_power(&self) -> Option<u8> {
        match self.ctx.native().current_battery_power() {
            ON_AC_POWER => None,
            percent => Some(percent),
        }
    }

    pub fn since_app_active(&self) -> Duration {
        Duration::from_secs(u64::from(self.ctx.native().seconds_since_app_active()))
    }

    /// Time since the user last touched the mouse or keyboard.
    pub fn since_computer_active(&self) -> Duration {
        Duration::from_secs(u64::from(self.ctx.native().seconds_since_computer_active()))
    }

    /// Platform server time, to the nearest second.
    pub fn server_real_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(u64::from(self.ctx.native().server_real_time()))
    }

    /// Whether the overlay is running and usable. Stays false for a few
    /// seconds after launch while the overlay hooks the process.
    pub fn is_overlay_enabled(&self) -> bool {
        self.ctx.native().is_overlay_enabled()
    }

    /// For event-driven renderers: whether the overlay needs a present to
    /// draw. Poll at around 33 Hz.
    pub fn overlay_needs_present(&self) -> bool {
        self.ctx.native().overlay_needs_present()
    }

    pub fn is_big_picture_mode(&self) -> bool {
        self.ctx.native().is_steam_in_big_picture_mode()
    }

    /// Corner for overlay notification popups. Resets every launch.
    pub fn set_notification_position(&self, position: NotificationPosition) {
        let _guard = self.ctx.guard();
        self.ctx.native().set_overlay_notification_position(position);
    }

    /// Offset of notification popups from their corner. `(0, 0)` puts
    /// them back in the corner.
    pub fn set_notification_inset(&self, horizontal: i32, vertical: i32) {
        let _guard = self.ctx.guard();
        self.ctx
            .native()
            .set_overlay_notification_inset(horizontal, vertical);
    }

    /// Calls `f` with the remaining battery time when under ten minutes
    /// are left, then once a minute.
    pub fn on_low_battery<F>(&self, f: F) -> Registration
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.ctx.register(move |low: LowBatteryPower| {
            let left = Duration::from_secs(u64::from(low.minutes_left()) * 60);
            debug!(minutes_left = low.minutes_left(), "low battery");
            f(left);
        })
    }

    /// Calls `f` when the user's IP country changes. Read the new one with
    /// [`ip_country`](Self::ip_country).
    pub fn on_ip_country_changed<F>(&self, f: F) -> Registration
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.ctx.register(move |_: IpCountryChanged| f())
    }

    /// Calls `f` when the platform client is about to shut down.
    pub fn on_steam_shutdown<F>(&self, f: F) -> Registration
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.ctx.register(move |_: SteamShutdown| {
            debug!("platform client shutting down");
            f();
        })
    }

    /// Calls `f` with each warning the SDK prints.
    ///
    /// Any number of hooks may be registered; they share the SDK's single
    /// message hook, which is installed on first use.
    pub fn on_warning_message<F>(&self, f: F) -> Registration
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.ctx.register_message_hook(MessageSeverity::Warning, f)
    }

    /// Calls `f` with each debug line the SDK prints. The SDK only emits
    /// these when the platform client runs with `-debug_steamapi`.
    pub fn on_debug_message<F>(&self, f: F) -> Registration
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.ctx.register_message_hook(MessageSeverity::Debug, f)
    }
}

impl fmt::Debug for Utils {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Utils").finish_non_exhaustive()
    }
}
