use std::fmt;

use tracing::{debug, warn};
use vapor_native::{
    ActionOrigin, ActionSetHandle, AnalogActionHandle, ControllerHandle, DigitalActionHandle,
};
use vapor_runtime::{Context, ResettableOnce, ThreadGuard};

use crate::{AnalogActionData, ControllerError, DigitalActionData, MotionData};

/// Entry point to controller input for one SDK instance.
///
/// The subsystem is started by [`init`](Self::init) and stopped with the
/// rest of the SDK; every `Controllers` built on the same [`Context`]
/// shares that state.
#[derive(Clone)]
pub struct Controllers {
    ctx: Context,
    started: ResettableOnce,
}

impl Controllers {
    pub fn new(ctx: Context) -> Self {
        let started = ctx.once_group().named("controller");
        Self { ctx, started }
    }

    /// Starts the controller subsystem. Further calls are no-ops until the
    /// SDK shuts down.
    pub fn init(&self) -> Result<(), ControllerError> {
        if self.started.is_done() {
            return Ok(());
        }

        let ok = {
            let _guard = self.ctx.guard();
            self.ctx.native().controller_init()
        };
        if !ok {
            warn!("controller subsystem failed to start");
            return Err(ControllerError::InitFailed);
        }

        let native = self.ctx.native().clone();
        self.started.call_once(|hooks| {
            hooks.push(move || {
                let _guard = ThreadGuard::acquire(&native);
                native.controller_shutdown();
                debug!("controller subsystem stopped");
            });
            debug!("controller subsystem started");
        });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.started.is_done()
    }

    fn ensure_init(&self) -> Result<(), ControllerError> {
        if self.started.is_done() {
            Ok(())
        } else {
            Err(ControllerError::NotInitialized)
        }
    }

    /// Polls every controller now instead of waiting for the next pump.
    pub fn run_frame(&self) -> Result<(), ControllerError> {
        self.ensure_init()?;
        let _guard = self.ctx.guard();
        self.ctx.native().controller_run_frame();
        Ok(())
    }

    /// Controllers currently connected, in the SDK's order.
    pub fn connected(&self) -> Result<Vec<Controller>, ControllerError> {
        self.ensure_init()?;
        Ok(self
            .ctx
            .native()
            .connected_controllers()
            .into_iter()
            .map(|handle| self.controller(handle))
            .collect())
    }

    /// Addresses every connected controller at once, e.g. to switch all
    /// of them to the same action set.
    pub fn all(&self) -> Result<Controller, ControllerError> {
        self.ensure_init()?;
        Ok(self.controller(ControllerHandle::ALL))
    }

    /// The controller emulating XInput gamepad `index`, if any.
    pub fn for_gamepad_index(&self, index: u32) -> Result<Option<Controller>, ControllerError> {
        self.ensure_init()?;
        let Ok(index) = i32::try_from(index) else {
            return Ok(None);
        };
        let handle = self.ctx.native().controller_for_gamepad_index(index);
        Ok((handle != ControllerHandle::default()).then(|| self.controller(handle)))
    }

    fn controller(&self, handle: ControllerHandle) -> Controller {
        Controller {
            ctx: self.ctx.clone(),
            handle,
        }
    }

    pub fn action_set(&self, name: &str) -> Result<ActionSetHandle, ControllerError> {
        self.ensure_init()?;
        let handle = self.ctx.native().action_set_handle(name);
        if handle.is_valid() {
            Ok(handle)
        } else {
            Err(ControllerError::UnknownActionSet(name.to_string()))
        }
    }

    pub fn digital_action(&self, name: &str) -> Result<DigitalActionHandle, ControllerError> {
        self.ensure_init()?;
        let handle = self.ctx.native().digital_action_handle(name);
        if handle.is_valid() {
            Ok(handle)
        } else {
            Err(ControllerError::UnknownAction(name.to_string()))
        }
    }

    pub fn analog_action(&self, name: &str) -> Result<AnalogActionHandle, ControllerError> {
        self.ensure_init()?;
        let handle = self.ctx.native().analog_action_handle(name);
        if handle.is_valid() {
            Ok(handle)
        } else {
            Err(ControllerError::UnknownAction(name.to_string()))
        }
    }

    /// Local path to a PNG glyph for `origin`, for on-screen prompts.
    pub fn glyph(&self, origin: ActionOrigin) -> Option<String> {
        let path = self.ctx.native().glyph_for_action_origin(origin);
        (!path.is_empty()).then_some(path)
    }

    /// Localized name of `origin` in the platform client's language.
    pub fn origin_name(&self, origin: ActionOrigin) -> String {
        self.ctx.native().string_for_action_origin(origin)
    }
}

impl fmt::Debug for Controllers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controllers")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// One connected controller, or all of them for
/// [`Controllers::all`].
///
/// Reads return the state sampled by the last pump or
/// [`Controllers::run_frame`]. A controller that has since disconnected
/// reads as inactive.
#[derive(Clone)]
pub struct Controller {
    pub(crate) ctx: Context,
    pub(crate) handle: ControllerHandle,
}

impl Controller {
    pub fn handle(&self) -> ControllerHandle {
        self.handle
    }

    /// XInput slot this controller is emulating, if any.
    pub fn gamepad_index(&self) -> Option<u32> {
        u32::try_from(self.ctx.native().gamepad_index_for_controller(self.handle)).ok()
    }

    /// Switches to `set`. Cheap enough to call every frame.
    pub fn activate_action_set(&self, set: ActionSetHandle) {
        let _guard = self.ctx.guard();
        self.ctx.native().activate_action_set(self.handle, set);
    }

    pub fn current_action_set(&self) -> ActionSetHandle {
        self.ctx.native().current_action_set(self.handle)
    }

    pub fn digital(&self, action: DigitalActionHandle) -> DigitalActionData {
        self.ctx.native().digital_action_data(self.handle, action).into()
    }

    pub fn analog(&self, action: AnalogActionHandle) -> AnalogActionData {
        self.ctx.native().analog_action_data(self.handle, action).into()
    }

    /// Physical inputs bound to `action` within `set`, at most
    /// [`MAX_ORIGINS`](crate::MAX_ORIGINS).
    pub fn digital_origins(&self, set: ActionSetHandle, action: DigitalActionHandle) -> Vec<ActionOrigin> {
        self.ctx.native().digital_action_origins(self.handle, set, action)
    }

    pub fn analog_origins(&self, set: ActionSetHandle, action: AnalogActionHandle) -> Vec<ActionOrigin> {
        self.ctx.native().analog_action_origins(self.handle, set, action)
    }

    /// Stops the coasting of a trackball-style analog action.
    pub fn stop_momentum(&self, action: AnalogActionHandle) {
        let _guard = self.ctx.guard();
        self.ctx.native().stop_analog_action_momentum(self.handle, action);
    }

    pub fn motion(&self) -> MotionData {
        self.ctx.native().motion_data(self.handle).into()
    }

    /// Opens the overlay's binding screen for this controller. Returns
    /// false if the overlay is disabled or the controller is gone.
    pub fn show_binding_panel(&self) -> bool {
        let _guard = self.ctx.guard();
        self.ctx.native().show_binding_panel(self.handle)
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("handle", &self.handle)
            .finish()
    }
}
