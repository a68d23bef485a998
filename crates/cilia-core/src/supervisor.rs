//! Background connection supervisor.
//!
//! Keeps a [`Controller`] connected: connects right away, waits for the
//! session to drop, and reconnects on a schedule chosen by a
//! [`RetryStrategy`].
//!
//! ```rust,ignore
//! use cilia_core::supervisor::{self, ExponentialBackoff};
//! use tokio_util::sync::CancellationToken;
//!
//! let handle = supervisor::spawn(controller.clone(), ExponentialBackoff::default(), CancellationToken::new());
//! // ... issue commands through `controller` ...
//! handle.shutdown();
//! handle.join().await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use cilia_api::Connector;

use crate::controller::{ConnectionState, Controller};

// ── Retry strategies ─────────────────────────────────────────────────

/// Decides how long to wait after a failed connection attempt.
pub trait RetryStrategy: Send + 'static {
    /// Delay before the next attempt, given the number of consecutive
    /// failures so far (at least 1). `None` stops the supervisor.
    fn next_delay(&mut self, failures: u32) -> Option<Duration>;
}

/// Retry forever at a fixed cadence, like a host polling every frame.
#[derive(Debug, Clone)]
pub struct PollInterval {
    pub interval: Duration,
}

impl Default for PollInterval {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

impl RetryStrategy for PollInterval {
    fn next_delay(&mut self, _failures: u32) -> Option<Duration> {
        Some(self.interval)
    }
}

/// Doubling backoff, capped, with a fixed spread so retries from
/// several clients do not line up.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Delay after the first failure. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on the delay before jitter. Default: 30s.
    pub max_delay: Duration,

    /// Retries after the first failed attempt before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

impl ExponentialBackoff {
    /// Spread applied on top of the capped delay, cycling through
    /// 80%, 90%, 100%, 110%, 120%.
    const SPREAD: [f64; 5] = [0.8, 0.9, 1.0, 1.1, 1.2];

    fn delay_after(&self, failures: u32) -> Duration {
        let doublings = failures.saturating_sub(1);
        let capped = self
            .initial_delay
            .saturating_mul(2_u32.saturating_pow(doublings))
            .min(self.max_delay);
        let spread = Self::SPREAD
            .get(usize::try_from(doublings).unwrap_or(0) % Self::SPREAD.len())
            .copied()
            .unwrap_or(1.0);
        capped.mul_f64(spread)
    }
}

impl RetryStrategy for ExponentialBackoff {
    fn next_delay(&mut self, failures: u32) -> Option<Duration> {
        if self.max_retries.is_some_and(|max| failures > max) {
            return None;
        }
        Some(self.delay_after(failures))
    }
}

// ── Supervisor task ──────────────────────────────────────────────────

/// Handle to a running supervisor.
pub struct SupervisorHandle {
    cancel: CancellationToken,
    stopped: CancellationToken,
    poll: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SupervisorHandle {
    /// Cut a pending retry delay short and try again now.
    pub fn poll(&self) {
        self.poll.notify_one();
    }

    /// Stop supervising. Does not disconnect the controller.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// `true` once the supervisor has stopped, either through
    /// [`shutdown`](Self::shutdown) or because the strategy gave up.
    pub fn is_finished(&self) -> bool {
        self.stopped.is_cancelled()
    }

    /// Resolves once the supervisor loop has exited.
    pub async fn stopped(&self) {
        self.stopped.cancelled().await;
    }

    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "supervisor task ended abnormally");
        }
    }
}

/// Spawn a task that keeps `controller` connected until `cancel` fires.
pub fn spawn<C, R>(controller: Controller<C>, strategy: R, cancel: CancellationToken) -> SupervisorHandle
where
    C: Connector,
    R: RetryStrategy,
{
    let poll = Arc::new(Notify::new());
    let stopped = CancellationToken::new();

    let task_cancel = cancel.clone();
    let task_poll = Arc::clone(&poll);
    let task_stopped = stopped.clone();
    let task = tokio::spawn(async move {
        let _stopped = task_stopped.drop_guard();
        supervise(controller, strategy, task_cancel, task_poll).await;
    });

    SupervisorHandle {
        cancel,
        stopped,
        poll,
        task,
    }
}

async fn supervise<C, R>(
    controller: Controller<C>,
    mut strategy: R,
    cancel: CancellationToken,
    poll: Arc<Notify>,
) where
    C: Connector,
    R: RetryStrategy,
{
    let mut state_rx = controller.connection_state();
    let mut failures: u32 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            open = wait_for_disconnect(&mut state_rx) => {
                if !open {
                    break;
                }
            }
        }

        // A dropped attempt releases its `Connecting` claim.
        let attempt = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = controller.connect_configured() => result,
        };

        match attempt {
            Ok(()) => {
                if failures > 0 {
                    info!(failures, "reconnected to device");
                }
                failures = 0;
            }
            Err(e) if !e.is_retryable() => {
                error!(error = %e, "device connection cannot succeed, supervisor stopping");
                break;
            }
            Err(e) => {
                failures = failures.saturating_add(1);
                let Some(delay) = strategy.next_delay(failures) else {
                    error!(failures, error = %e, "giving up on device connection");
                    break;
                };
                info!(
                    failures,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "retrying device connection"
                );

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = poll.notified() => debug!("poll requested, retrying now"),
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }
    }

    debug!("supervisor stopped");
}

/// Resolves once the controller is disconnected. `false` if the
/// controller is gone.
async fn wait_for_disconnect(state_rx: &mut watch::Receiver<ConnectionState>) -> bool {
    state_rx
        .wait_for(|state| *state == ConnectionState::Disconnected)
        .await
        .is_ok()
}
