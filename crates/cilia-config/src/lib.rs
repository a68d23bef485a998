//! Shared configuration for Cilia tools.
//!
//! TOML device profiles, name sanitization, and translation to
//! `cilia_core::DeviceConfig`. The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cilia_core::{
    DEFAULT_GROUPS, DEFAULT_PROFILE_NAME, DEFAULT_SCENTS, DeviceConfig, GameProfile, LIGHT_COUNT,
    RgbColor,
};

/// Longest scent, group, or profile name the device accepts.
pub const MAX_NAME_LEN: usize = 20;

/// Group IDs are single bytes.
pub const MAX_GROUPS: usize = 256;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Handshake timeout in seconds. 0 waits indefinitely.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Per-message write timeout in seconds. 0 waits indefinitely.
    #[serde(default = "default_send_timeout")]
    pub send_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            send_timeout: default_send_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_send_timeout() -> u64 {
    5
}

/// A named device profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Host running the Cilia SDK service.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Profile nickname shown on the device.
    #[serde(default = "default_profile_name")]
    pub name: String,

    #[serde(default)]
    pub default_group: u8,

    /// Scent library, in fan slot order.
    #[serde(default = "default_scents")]
    pub scents: Vec<String>,

    /// Group names; a group's ID is its position.
    #[serde(default = "default_groups")]
    pub groups: Vec<String>,

    /// Initial light colors as decimal `RRRGGGBBB[WWW]` strings.
    #[serde(default = "default_lights")]
    pub lights: Vec<String>,

    /// Connect as soon as the host starts.
    pub auto_connect: Option<bool>,

    /// Send the profile after every handshake.
    pub load_profile: Option<bool>,

    /// Override handshake timeout.
    pub timeout: Option<u64>,

    /// Override write timeout.
    pub send_timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            name: default_profile_name(),
            default_group: 0,
            scents: default_scents(),
            groups: default_groups(),
            lights: default_lights(),
            auto_connect: None,
            load_profile: None,
            timeout: None,
            send_timeout: None,
        }
    }
}

fn default_host() -> String {
    cilia_core::DeviceConfig::default().host
}
fn default_port() -> u16 {
    cilia_core::DeviceConfig::default().port
}
fn default_profile_name() -> String {
    DEFAULT_PROFILE_NAME.into()
}
fn default_scents() -> Vec<String> {
    DEFAULT_SCENTS.iter().map(ToString::to_string).collect()
}
fn default_groups() -> Vec<String> {
    DEFAULT_GROUPS.iter().map(ToString::to_string).collect()
}
fn default_lights() -> Vec<String> {
    vec![RgbColor::BLACK.to_string(); LIGHT_COUNT]
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "cilia", "cilia").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("cilia");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`, layering `CILIA_*` environment variables on
/// top. Nested keys use `__`, e.g. `CILIA_DEFAULTS__TIMEOUT=3`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CILIA_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Name sanitization ───────────────────────────────────────────────

/// Clean one user-supplied name: cut to [`MAX_NAME_LEN`] characters,
/// then drop everything that is not an ASCII letter or digit.
///
/// Returns `None` when nothing is left.
pub fn sanitize_name(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .take(MAX_NAME_LEN)
        .filter(char::is_ascii_alphanumeric)
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Sanitize a list of names. An entry that cleans down to nothing takes
/// the built-in default at the same position.
pub fn sanitize_names(
    field: &str,
    names: &[String],
    defaults: &[&str],
) -> Result<Vec<String>, ConfigError> {
    names
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            sanitize_name(raw)
                .or_else(|| defaults.get(i).map(ToString::to_string))
                .ok_or_else(|| ConfigError::Validation {
                    field: format!("{field}[{i}]"),
                    reason: format!("'{raw}' has no letters or digits and there is no default"),
                })
        })
        .collect()
}

// ── Translation to runtime config ───────────────────────────────────

/// Build the session profile from a config profile.
pub fn profile_to_game_profile(profile: &Profile) -> Result<GameProfile, ConfigError> {
    if profile.groups.len() > MAX_GROUPS {
        return Err(ConfigError::Validation {
            field: "groups".into(),
            reason: format!(
                "{} groups configured, at most {MAX_GROUPS} are addressable",
                profile.groups.len()
            ),
        });
    }
    if usize::from(profile.default_group) >= profile.groups.len().max(1) {
        return Err(ConfigError::Validation {
            field: "default_group".into(),
            reason: format!(
                "{} is not a configured group ({} groups)",
                profile.default_group,
                profile.groups.len()
            ),
        });
    }

    let lights = profile
        .lights
        .iter()
        .enumerate()
        .map(|(i, light)| {
            light.parse::<RgbColor>().map_err(|e| ConfigError::Validation {
                field: format!("lights[{i}]"),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GameProfile {
        name: sanitize_name(&profile.name).unwrap_or_else(default_profile_name),
        default_group: profile.default_group,
        scents: sanitize_names("scents", &profile.scents, &DEFAULT_SCENTS)?,
        groups: sanitize_names("groups", &profile.groups, &DEFAULT_GROUPS)?,
        lights,
    })
}

/// Build a `DeviceConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_device_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<DeviceConfig, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }

    Ok(DeviceConfig {
        host: profile.host.clone(),
        port: profile.port,
        connect_timeout: seconds(profile.timeout.unwrap_or(defaults.timeout)),
        send_timeout: seconds(profile.send_timeout.unwrap_or(defaults.send_timeout)),
        auto_connect: profile.auto_connect.unwrap_or(true),
        load_profile: profile.load_profile.unwrap_or(true),
        profile: profile_to_game_profile(profile)?,
    })
}

/// Zero means "no limit".
fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Look up a profile by name.
pub fn find_profile<'a>(cfg: &'a Config, name: &str) -> Result<&'a Profile, ConfigError> {
    cfg.profiles
        .get(name)
        .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
}
