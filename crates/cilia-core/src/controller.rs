// ── Controller abstraction ──
//
// Owns the single device session. Connection management and the send
// gate live together because both guard the same two cells: the
// connection state and the session handle. Only this module writes
// either one.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use cilia_api::{Command, Connection, Connector, FanId, FrameSink, GroupTarget, WsConnector};

use crate::config::DeviceConfig;
use crate::error::CoreError;

// ── Connection state ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        })
    }
}

/// What happened to a message handed to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Written to the open session as one whole frame.
    Sent,
    /// Discarded because no session was open. Nothing was transmitted.
    Dropped,
}

impl Delivery {
    pub fn is_sent(self) -> bool {
        self == Self::Sent
    }
}

// ── Controller ───────────────────────────────────────────────────────

/// Cheaply cloneable handle to one device connection.
///
/// Every clone shares the same session. Commands issued while the
/// controller is not connected are dropped, never queued.
pub struct Controller<C: Connector = WsConnector> {
    inner: Arc<ControllerInner<C>>,
}

impl<C: Connector> Clone for Controller<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ControllerInner<C: Connector> {
    config: DeviceConfig,
    connector: C,
    connection_state: watch::Sender<ConnectionState>,
    /// The send gate. At most one frame write is in flight while held.
    session: Mutex<Option<Session<C::Sink>>>,
    next_session_id: AtomicU64,
}

impl<C: Connector> Drop for ControllerInner<C> {
    fn drop(&mut self) {
        // Stops the transport's reader and the session watcher.
        if let Some(session) = self.session.get_mut().take() {
            session.closed.cancel();
        }
    }
}

struct Session<S> {
    id: u64,
    sink: S,
    closed: CancellationToken,
}

impl Controller<WsConnector> {
    /// Create a controller that talks WebSocket. Does not connect.
    pub fn new(config: DeviceConfig) -> Self {
        Self::with_connector(config, WsConnector)
    }
}

impl<C: Connector> Controller<C> {
    /// Create a controller over a custom transport. Does not connect.
    pub fn with_connector(config: DeviceConfig, connector: C) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(ControllerInner {
                config,
                connector,
                connection_state,
                session: Mutex::new(None),
                next_session_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.inner.config
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.connection_state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Connect to the endpoint from the controller's config.
    pub async fn connect_configured(&self) -> Result<(), CoreError> {
        let DeviceConfig { host, port, .. } = &self.inner.config;
        self.connect(host, *port).await
    }

    /// Open a session to `ws://{host}:{port}`.
    ///
    /// No-op while connected or while another attempt is in flight.
    /// After the handshake the session profile is sent if
    /// `load_profile` is enabled; a failure there is returned and leaves
    /// the controller disconnected.
    ///
    /// Dropping the returned future mid-handshake puts the controller
    /// back to `Disconnected`.
    pub async fn connect(&self, host: &str, port: u16) -> Result<(), CoreError> {
        let url = cilia_api::endpoint_url(host, port)?;

        let Some(claim) = self.begin_connect() else {
            debug!(state = %self.state(), "connect skipped");
            return Ok(());
        };

        info!(url = %url, "connecting to device");
        let limit = self.inner.config.connect_timeout;
        let connection = match within(limit, self.inner.connector.connect(&url)).await {
            Some(Ok(connection)) => connection,
            Some(Err(e)) => {
                self.set_state(ConnectionState::Disconnected);
                warn!(url = %url, error = %e, "failed to connect to device");
                return Err(CoreError::ConnectionFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
            None => {
                self.set_state(ConnectionState::Disconnected);
                warn!(url = %url, "device handshake timed out");
                return Err(CoreError::timeout("connect", limit.unwrap_or_default()));
            }
        };

        let session_id = self.install_session(connection, claim).await;
        info!(url = %url, session = session_id, "connected to device");

        if self.inner.config.load_profile {
            self.load_profile().await?;
        }
        Ok(())
    }

    /// Close the session. No-op unless connected.
    ///
    /// State flips to `Disconnected` before the close frame goes out, so
    /// concurrent callers stop sending immediately.
    pub async fn disconnect(&self) -> Result<(), CoreError> {
        let was_connected = self.inner.connection_state.send_if_modified(|state| {
            if *state == ConnectionState::Connected {
                *state = ConnectionState::Disconnected;
                true
            } else {
                false
            }
        });
        if !was_connected {
            debug!(state = %self.state(), "disconnect skipped, not connected");
            return Ok(());
        }

        info!("disconnecting from device");
        let session = {
            let mut guard = self.inner.session.lock().await;
            // A connect that completed between the state flip and the
            // lock owns the slot now.
            if self.state() == ConnectionState::Connected {
                debug!("session replaced before disconnect");
                None
            } else {
                guard.take()
            }
        };
        match session {
            Some(session) => self.close_session(session).await,
            None => Ok(()),
        }
    }

    /// Connect, run `f`, then disconnect regardless of its outcome.
    pub async fn oneshot<F, Fut, T>(&self, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        self.connect_configured().await?;
        let result = f(self.clone()).await;
        if let Err(e) = self.disconnect().await {
            debug!(error = %e, "disconnect after one-shot failed");
        }
        result
    }

    // ── Send gate ────────────────────────────────────────────────────

    /// Push one encoded document to the device.
    ///
    /// Returns `Dropped` without touching the network when not connected.
    /// A failed or timed-out write disconnects the controller and is
    /// reported only to this caller. Nothing is retried.
    pub async fn send(&self, payload: String) -> Result<Delivery, CoreError> {
        let mut guard = self.inner.session.lock().await;

        if !self.is_connected() {
            trace!("not connected, dropping message");
            return Ok(Delivery::Dropped);
        }
        let Some(session) = guard.as_mut() else {
            trace!("no open session, dropping message");
            return Ok(Delivery::Dropped);
        };

        let bytes = payload.len();
        let limit = self.inner.config.send_timeout;
        let error = match within(limit, session.sink.send_text(payload)).await {
            Some(Ok(())) => {
                trace!(session = session.id, bytes, "message sent");
                return Ok(Delivery::Sent);
            }
            Some(Err(e)) => CoreError::from(e),
            None => CoreError::timeout("send", limit.unwrap_or_default()),
        };

        let failed = guard.take();
        self.set_state(ConnectionState::Disconnected);
        drop(guard);

        warn!(error = %error, "send failed, disconnecting from device");
        if let Some(session) = failed {
            if let Err(e) = self.close_session(session).await {
                debug!(error = %e, "close after failed send");
            }
        }
        Err(error)
    }

    /// Encode `command` for `target` and send it.
    ///
    /// Encoding happens first, so a malformed target is reported even
    /// while disconnected.
    pub async fn execute(
        &self,
        command: &Command,
        target: &GroupTarget,
    ) -> Result<Delivery, CoreError> {
        let payload = command.encode(target)?;
        debug!(command = command.key(), target = ?target, "sending command");
        self.send(payload).await
    }

    // ── Device commands ──────────────────────────────────────────────

    /// Set light `light` (1-6) to an RGB color.
    pub async fn set_light(
        &self,
        target: &GroupTarget,
        light: u8,
        red: u8,
        green: u8,
        blue: u8,
    ) -> Result<Delivery, CoreError> {
        let command = Command::SetLight {
            light,
            red,
            green,
            blue,
        };
        self.execute(&command, target).await
    }

    /// Spin a fan, addressed by slot index or by the scent it holds.
    pub async fn set_fan(
        &self,
        target: &GroupTarget,
        fan: impl Into<FanId>,
        speed: u8,
    ) -> Result<Delivery, CoreError> {
        let command = Command::SetFan {
            fan: fan.into(),
            speed,
        };
        self.execute(&command, target).await
    }

    /// Spin every fan loaded with `scent`.
    pub async fn set_scent(
        &self,
        target: &GroupTarget,
        scent: impl Into<String>,
        speed: u8,
    ) -> Result<Delivery, CoreError> {
        let command = Command::SetScent {
            scent: scent.into(),
            speed,
        };
        self.execute(&command, target).await
    }

    /// Set fan `fan` on every device.
    pub async fn set_fan_speed(&self, fan: u32, speed: u8) -> Result<Delivery, CoreError> {
        self.set_fan(&GroupTarget::All, fan, speed).await
    }

    /// Send the configured session profile.
    pub async fn load_profile(&self) -> Result<Delivery, CoreError> {
        let command = self.inner.config.profile.to_command();
        let delivery = self.execute(&command, &GroupTarget::All).await?;
        if delivery.is_sent() {
            info!(profile = %self.inner.config.profile.name, "profile loaded");
        }
        Ok(delivery)
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Atomically claim the right to connect. Only a disconnected
    /// controller can be claimed.
    fn begin_connect(&self) -> Option<ConnectClaim<'_>> {
        let claimed = self.inner.connection_state.send_if_modified(|state| {
            if *state == ConnectionState::Disconnected {
                *state = ConnectionState::Connecting;
                true
            } else {
                false
            }
        });
        claimed.then_some(ConnectClaim {
            state: &self.inner.connection_state,
        })
    }

    fn set_state(&self, next: ConnectionState) {
        let prev = self.inner.connection_state.send_replace(next);
        if prev != next {
            debug!(from = %prev, to = %next, "connection state changed");
        }
    }

    async fn install_session(&self, connection: Connection<C::Sink>, claim: ConnectClaim<'_>) -> u64 {
        let id = self.inner.next_session_id.fetch_add(1, Ordering::Relaxed);
        let Connection { sink, closed } = connection;
        // Stops the transport reader if we are dropped while queued on the lock.
        let abandoned = closed.clone().drop_guard();

        let mut guard = self.inner.session.lock().await;
        let stale = guard.replace(Session {
            id,
            sink,
            closed: closed.clone(),
        });
        abandoned.disarm();
        self.set_state(ConnectionState::Connected);
        drop(claim);
        drop(guard);

        self.watch_session(id, closed);
        if let Some(stale) = stale {
            debug!(session = stale.id, "replacing leftover session");
            if let Err(e) = self.close_session(stale).await {
                debug!(error = %e, "close of leftover session");
            }
        }
        id
    }

    /// Tear the session down when the transport reports a peer close.
    fn watch_session(&self, id: u64, closed: CancellationToken) {
        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            closed.cancelled().await;
            if let Some(inner) = inner.upgrade() {
                Controller { inner }.on_session_closed(id).await;
            }
        });
    }

    async fn on_session_closed(&self, id: u64) {
        let mut guard = self.inner.session.lock().await;
        if guard.as_ref().is_some_and(|session| session.id == id) {
            guard.take();
            self.set_state(ConnectionState::Disconnected);
            info!(session = id, "device closed the connection");
        }
    }

    async fn close_session(&self, mut session: Session<C::Sink>) -> Result<(), CoreError> {
        session.closed.cancel();
        let limit = self.inner.config.send_timeout;
        match within(limit, session.sink.close()).await {
            Some(Ok(())) => {
                debug!(session = session.id, "session closed");
                Ok(())
            }
            Some(Err(e)) => Err(e.into()),
            None => Err(CoreError::timeout("close", limit.unwrap_or_default())),
        }
    }
}

/// A claimed `Connecting` state. Dropped before the session is
/// installed, it returns the controller to `Disconnected`.
struct ConnectClaim<'a> {
    state: &'a watch::Sender<ConnectionState>,
}

impl Drop for ConnectClaim<'_> {
    fn drop(&mut self) {
        let released = self.state.send_if_modified(|state| {
            if *state == ConnectionState::Connecting {
                *state = ConnectionState::Disconnected;
                true
            } else {
                false
            }
        });
        if released {
            debug!("connect attempt abandoned");
        }
    }
}

/// Await `fut`, bounded by `limit` when one is set. `None` means the
/// limit elapsed.
async fn within<F: Future>(limit: Option<Duration>, fut: F) -> Option<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.ok(),
        None => Some(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_controller_starts_disconnected() {
        let controller = Controller::new(DeviceConfig::default());
        assert_eq!(controller.state(), ConnectionState::Disconnected);
        assert_eq!(*controller.connection_state().borrow(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn commands_without_session_are_dropped() {
        let controller = Controller::new(DeviceConfig::default());
        let delivery = controller
            .set_light(&GroupTarget::All, 1, 255, 0, 0)
            .await;
        assert!(matches!(delivery, Ok(Delivery::Dropped)));
    }

    #[tokio::test]
    async fn empty_group_target_is_reported_while_disconnected() {
        let controller = Controller::new(DeviceConfig::default());
        let result = controller
            .set_scent(&GroupTarget::groups([]), "Rose", 10)
            .await;
        assert!(matches!(result, Err(CoreError::Protocol { .. })));
    }

    #[tokio::test]
    async fn disconnect_when_idle_is_a_no_op() {
        let controller = Controller::new(DeviceConfig::default());
        assert!(controller.disconnect().await.is_ok());
        assert!(controller.disconnect().await.is_ok());
        assert_eq!(controller.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn within_without_limit_always_completes() {
        assert_eq!(within(None, async { 7 }).await, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn within_reports_elapsed_limit() {
        let result = within(
            Some(Duration::from_millis(10)),
            tokio::time::sleep(Duration::from_secs(60)),
        )
        .await;
        assert!(result.is_none());
    }
}
