use serde::Deserialize;
use vapor_pump::PumpConfig;
use vapor_types::AppId;

/// Client settings, loadable from the application's own config file.
///
/// ```json
/// { "app_id": 480, "pump": { "mode": "background", "interval": 2000 } }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// The app this build belongs to. When set, initialization warns if
    /// the platform reports a different one.
    pub app_id: Option<AppId>,
    pub pump: PumpConfig,
}
