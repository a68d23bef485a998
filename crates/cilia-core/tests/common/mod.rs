// In-memory transport for controller tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;

use cilia_api::{Connection, Connector, Error, FrameSink};
use cilia_core::DeviceConfig;

/// One observable step of a frame write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireEvent {
    Begin,
    Chunk(String),
    End,
}

#[derive(Default)]
struct MockState {
    wire: Mutex<Vec<WireEvent>>,
    sessions: Mutex<Vec<CancellationToken>>,
    connects: AtomicU32,
    closes: AtomicU32,
    failing_connects: AtomicU32,
    hang_connects: AtomicBool,
    fail_sends: AtomicBool,
}

/// A connector whose sessions record every write.
///
/// Writes are split into two chunks with a yield in between, so any
/// interleaving of concurrent writes shows up in [`MockConnector::wire`].
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<MockState>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` connection attempts fail.
    pub fn fail_next_connects(&self, count: u32) {
        self.state.failing_connects.store(count, Ordering::SeqCst);
    }

    /// Make connection attempts never complete.
    pub fn hang_connects(&self, hang: bool) {
        self.state.hang_connects.store(hang, Ordering::SeqCst);
    }

    pub fn fail_sends(&self, fail: bool) {
        self.state.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn connect_attempts(&self) -> u32 {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> u32 {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn wire(&self) -> Vec<WireEvent> {
        self.state.wire.lock().unwrap().clone()
    }

    /// Whole frames reassembled from the wire log.
    pub fn frames(&self) -> Vec<String> {
        let mut frames = Vec::new();
        let mut current = String::new();
        for event in self.wire() {
            match event {
                WireEvent::Begin => current.clear(),
                WireEvent::Chunk(chunk) => current.push_str(&chunk),
                WireEvent::End => frames.push(std::mem::take(&mut current)),
            }
        }
        frames
    }

    /// Simulate the device closing the most recent session.
    pub fn peer_close(&self) {
        if let Some(token) = self.state.sessions.lock().unwrap().last() {
            token.cancel();
        }
    }
}

impl Connector for MockConnector {
    type Sink = MockSink;

    async fn connect(&self, url: &Url) -> Result<Connection<MockSink>, Error> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self.state.hang_connects.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let failing = self
            .state
            .failing_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(Error::WebSocketConnect(format!("{url}: connection refused")));
        }

        let closed = CancellationToken::new();
        self.state.sessions.lock().unwrap().push(closed.clone());
        Ok(Connection {
            sink: MockSink {
                state: Arc::clone(&self.state),
            },
            closed,
        })
    }
}

pub struct MockSink {
    state: Arc<MockState>,
}

impl MockSink {
    fn record(&self, event: WireEvent) {
        self.state.wire.lock().unwrap().push(event);
    }
}

impl FrameSink for MockSink {
    async fn send_text(&mut self, text: String) -> Result<(), Error> {
        if self.state.fail_sends.load(Ordering::SeqCst) {
            return Err(Error::Send("connection reset by peer".into()));
        }

        let (head, tail) = text.split_at(text.len() / 2);
        self.record(WireEvent::Begin);
        self.record(WireEvent::Chunk(head.to_string()));
        tokio::task::yield_now().await;
        self.record(WireEvent::Chunk(tail.to_string()));
        self.record(WireEvent::End);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), Error> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Local endpoint config with profile upload off.
pub fn quiet_config() -> DeviceConfig {
    DeviceConfig {
        host: "127.0.0.1".into(),
        load_profile: false,
        connect_timeout: Some(Duration::from_secs(2)),
        send_timeout: Some(Duration::from_secs(2)),
        ..DeviceConfig::default()
    }
}
