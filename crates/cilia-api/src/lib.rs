// cilia-api: wire protocol and WebSocket transport for Cilia device controllers

pub mod error;
pub mod protocol;
pub mod transport;
pub mod websocket;

pub use error::Error;
pub use protocol::{Command, Effect, EffectOptions, FanId, GroupEnvelope, GroupTarget, ProfileDocument};
pub use transport::{Connection, Connector, DEFAULT_HOST, DEFAULT_PORT, FrameSink, endpoint_url};
pub use websocket::{WsConnector, WsSink};
