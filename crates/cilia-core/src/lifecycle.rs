// Host application lifecycle hooks.
//
// The embedding host (a game loop, a daemon, the CLI's `run` command)
// reports coarse lifecycle events; the controller maps each one to a
// connect or disconnect.

use tracing::debug;

use cilia_api::Connector;

use crate::controller::{ConnectionState, Controller};
use crate::error::CoreError;

/// A lifecycle event reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    /// The host finished starting up.
    Started,
    /// Periodic tick. Used to reconnect after a drop.
    Poll,
    /// The host is shutting down or unloading the controller.
    Stopping,
}

impl<C: Connector> Controller<C> {
    pub async fn on_host_signal(&self, signal: HostSignal) -> Result<(), CoreError> {
        match signal {
            HostSignal::Started if self.config().auto_connect => self.connect_configured().await,
            HostSignal::Started => {
                debug!("auto-connect disabled, waiting for an explicit connect");
                Ok(())
            }
            HostSignal::Poll if self.state() == ConnectionState::Disconnected => {
                self.connect_configured().await
            }
            HostSignal::Poll => Ok(()),
            HostSignal::Stopping => self.disconnect().await,
        }
    }
}
