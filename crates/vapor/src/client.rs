use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};
use vapor_auth::AuthSessions;
use vapor_controller::Controllers;
use vapor_native::NativeApi;
use vapor_net::Networking;
use vapor_pump::{CallbackPump, PumpConfig, PumpMode};
use vapor_runtime::{Context, ThreadGuard};
use vapor_types::{AppId, SteamId};
use vapor_utils::{ParentalSettings, Utils};
use vapor_voice::Voice;

use crate::{ClientConfig, VaporError};

/// Asks the platform to relaunch this process through its client if it
/// wasn't started that way.
///
/// Returns `true` if a relaunch was started; the caller should then exit
/// as quickly as possible. Call before [`ClientBuilder::init`].
pub fn restart_app_if_necessary(native: &Arc<dyn NativeApi>, app_id: AppId) -> bool {
    let _guard = ThreadGuard::acquire(native);
    let restarting = native.restart_app_if_necessary(app_id);
    if restarting {
        info!(%app_id, "relaunching through the platform client");
    }
    restarting
}

/// Builder for [`Client`].
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every setting with `config`.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn app_id(mut self, app_id: AppId) -> Self {
        self.config.app_id = Some(app_id);
        self
    }

    pub fn pump(mut self, pump: PumpConfig) -> Self {
        self.config.pump = pump;
        self
    }

    /// Initializes `native` and starts callback pumping per the config.
    pub fn init(self, native: Arc<dyn NativeApi>) -> Result<Client, VaporError> {
        let ctx = Context::init(native)?;

        let app_id = ctx.native().app_id();
        if let Some(expected) = self.config.app_id {
            if expected != app_id {
                warn!(%expected, actual = %app_id, "platform reports a different app id than configured");
            }
        }

        let pump = CallbackPump::new(ctx.clone());
        if let Err(err) = pump.start(self.config.pump) {
            let _guard = ctx.guard();
            ctx.native().shutdown();
            return Err(err.into());
        }

        info!(%app_id, steam_id = %ctx.native().steam_id(), "client ready");
        Ok(Client {
            auth: AuthSessions::new(ctx.clone()),
            networking: Networking::new(ctx.clone()),
            voice: Voice::new(ctx.clone()),
            utils: Utils::new(ctx.clone()),
            controllers: Controllers::new(ctx.clone()),
            parental: ParentalSettings::new(ctx.clone()),
            mode: self.config.pump.mode,
            pump,
            ctx,
            shut_down: false,
        })
    }

    /// Loads the platform SDK from its default library name and
    /// initializes it.
    #[cfg(feature = "dylib")]
    pub fn init_sdk(self) -> Result<Client, VaporError> {
        let sdk = vapor_native::SteamSdk::load_default()?;
        self.init(Arc::new(sdk))
    }
}

/// An initialized SDK with every subsystem wired up.
///
/// Dropping the client shuts the SDK down, as does [`shutdown`](Self::shutdown).
pub struct Client {
    ctx: Context,
    pump: CallbackPump,
    mode: PumpMode,
    auth: AuthSessions,
    networking: Networking,
    voice: Voice,
    utils: Utils,
    controllers: Controllers,
    parental: ParentalSettings,
    shut_down: bool,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn auth(&self) -> &AuthSessions {
        &self.auth
    }

    pub fn networking(&self) -> &Networking {
        &self.networking
    }

    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    pub fn utils(&self) -> &Utils {
        &self.utils
    }

    /// Controller input. Call [`Controllers::init`] before reading it.
    pub fn controllers(&self) -> &Controllers {
        &self.controllers
    }

    pub fn parental(&self) -> &ParentalSettings {
        &self.parental
    }

    pub fn pump(&self) -> &CallbackPump {
        &self.pump
    }

    /// How callbacks are delivered, as configured at init. In
    /// [`PumpMode::Manual`] the application must call
    /// [`run_callbacks`](Self::run_callbacks) every frame.
    pub fn pump_mode(&self) -> PumpMode {
        self.mode
    }

    /// The logged-in user.
    pub fn steam_id(&self) -> SteamId {
        self.ctx.native().steam_id()
    }

    pub fn app_id(&self) -> AppId {
        self.ctx.native().app_id()
    }

    /// Delivers pending callbacks on this thread. Required once per frame
    /// in manual pump mode; harmless otherwise.
    pub fn run_callbacks(&self) {
        self.pump.run_once();
    }

    /// Stops the pump, runs every shutdown hook and shuts the SDK down.
    pub fn shutdown(mut self) {
        self.shut_down_once();
    }

    fn shut_down_once(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        self.pump.stop();
        self.ctx.once_group().reset();
        {
            let _guard = self.ctx.guard();
            self.ctx.native().shutdown();
        }
        info!(
            leaked_auth_sessions = self.auth.leaked_sessions(),
            "client shut down"
        );
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.shut_down_once();
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("mode", &self.mode)
            .field("pump_running", &self.pump.is_running())
            .field("shut_down", &self.shut_down)
            .finish()
    }
}
