use std::fmt;

use vapor_native::{ParentalFeature, ParentalSettingsChanged};
use vapor_runtime::{Context, Registration};
use vapor_types::AppId;

/// Family View restrictions for the current user.
#[derive(Clone)]
pub struct ParentalSettings {
    ctx: Context,
}

impl ParentalSettings {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn is_lock_enabled(&self) -> bool {
        self.ctx.native().is_parental_lock_enabled()
    }

    /// Whether restrictions are currently in force. An enabled lock can be
    /// temporarily unlocked with the PIN.
    pub fn is_lock_locked(&self) -> bool {
        self.ctx.native().is_parental_lock_locked()
    }

    pub fn is_app_blocked(&self, app_id: AppId) -> bool {
        self.ctx.native().is_app_blocked(app_id)
    }

    pub fn is_app_in_block_list(&self, app_id: AppId) -> bool {
        self.ctx.native().is_app_in_block_list(app_id)
    }

    pub fn is_feature_blocked(&self, feature: ParentalFeature) -> bool {
        self.ctx.native().is_feature_blocked(feature)
    }

    pub fn is_feature_in_block_list(&self, feature: ParentalFeature) -> bool {
        self.ctx.native().is_feature_in_block_list(feature)
    }

    /// Calls `f` whenever any parental setting changes.
    pub fn on_changed<F>(&self, f: F) -> Registration
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.ctx.register(move |_: ParentalSettingsChanged| f())
    }
}

impl fmt::Debug for ParentalSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentalSettings").finish_non_exhaustive()
    }
}
