//! CLI configuration -- thin wrapper around `cilia_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--host, --port, --timeout, --no-profile).

use cilia_core::DeviceConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use cilia_config::{Config, Defaults, Profile, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}

/// Build the `DeviceConfig` for this invocation.
///
/// An explicitly requested profile must exist. Without one, a missing
/// default profile falls back to the built-in defaults (localhost:1995).
pub fn build_device_config(global: &GlobalOpts) -> Result<DeviceConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => Profile::default(),
    };

    tracing::debug!(profile = %profile_name, "resolved device profile");
    resolve_profile(profile, &cfg.defaults, global)
}

/// Apply CLI flag overrides to a profile and translate it.
///
/// Flags take priority over profile values.
pub fn resolve_profile(
    mut profile: Profile,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<DeviceConfig, CliError> {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(port) = global.port {
        profile.port = port;
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if global.no_profile {
        profile.load_profile = Some(false);
    }

    Ok(cilia_config::profile_to_device_config(&profile, defaults)?)
}
