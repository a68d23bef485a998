// cilia-core: connection lifecycle and command surface for Cilia devices
//
// Wraps cilia-api's protocol and transport in a `Controller` that owns
// one device session, serializes every write through a single gate, and
// drops commands while disconnected.

pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod lifecycle;
pub mod profile;
pub mod supervisor;

// ── Primary re-exports ──────────────────────────────────────────────
pub use color::{ColorParseError, RgbColor};
pub use config::DeviceConfig;
pub use controller::{ConnectionState, Controller, Delivery};
pub use error::CoreError;
pub use lifecycle::HostSignal;
pub use profile::{DEFAULT_GROUPS, DEFAULT_PROFILE_NAME, DEFAULT_SCENTS, GameProfile, LIGHT_COUNT};
pub use supervisor::{ExponentialBackoff, PollInterval, RetryStrategy, SupervisorHandle};

// Protocol types callers need to address commands.
pub use cilia_api::{Command, FanId, GroupTarget};
