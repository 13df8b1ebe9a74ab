use crate::Utils;

impl Utils {
    /// Whether the platform client is running in VR mode.
    pub fn is_running_in_vr(&self) -> bool {
        self.ctx.native().is_steam_running_in_vr()
    }

    /// Opens the VR dashboard. Does nothing outside VR mode.
    pub fn start_vr_dashboard(&self) {
        let _guard = self.ctx.guard();
        self.ctx.native().start_vr_dashboard();
    }

    /// Whether in-home streaming sends the headset view rather than the
    /// desktop window.
    pub fn is_vr_headset_streaming_enabled(&self) -> bool {
        self.ctx.native().is_vr_headset_streaming_enabled()
    }

    /// Turn off to stream the desktop window instead, e.g. for games with
    /// a spectator view.
    pub fn set_vr_headset_streaming_enabled(&self, enabled: bool) {
        let _guard = self.ctx.guard();
        self.ctx.native().set_vr_headset_streaming_enabled(enabled);
    }
}
