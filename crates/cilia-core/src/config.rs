// ── Runtime device configuration ──
//
// Built by the CLI or config crate, passed to `Controller::new`.
// cilia-core never reads files; it takes this struct as-is.

use std::time::Duration;

use url::Url;

use cilia_api::{DEFAULT_HOST, DEFAULT_PORT};

use crate::error::CoreError;
use crate::profile::GameProfile;

/// Everything a `Controller` needs to reach and set up one device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on the WebSocket handshake. `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,
    /// Upper bound on a single frame write or close. `None` waits indefinitely.
    pub send_timeout: Option<Duration>,
    /// Connect when the host reports it has started.
    pub auto_connect: bool,
    /// Send `profile` right after every successful handshake.
    pub load_profile: bool,
    pub profile: GameProfile,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            connect_timeout: Some(Duration::from_secs(10)),
            send_timeout: Some(Duration::from_secs(5)),
            auto_connect: true,
            load_profile: true,
            profile: GameProfile::default(),
        }
    }
}

impl DeviceConfig {
    pub fn url(&self) -> Result<Url, CoreError> {
        Ok(cilia_api::endpoint_url(&self.host, self.port)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint_is_local_device() {
        let config = DeviceConfig::default();
        assert_eq!(config.url().unwrap().as_str(), "ws://localhost:1995/");
        assert!(config.auto_connect);
        assert!(config.load_profile);
    }

    #[test]
    fn blank_host_is_a_config_error() {
        let config = DeviceConfig {
            host: "  ".into(),
            ..DeviceConfig::default()
        };
        assert!(matches!(config.url(), Err(CoreError::Config { .. })));
    }
}
