//! Config subcommand handlers.

use std::collections::HashMap;

use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

#[derive(Clone, Tabled, serde::Serialize)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Scents")]
    scents: usize,
    #[tabled(rename = "Groups")]
    groups: usize,
    #[tabled(rename = "Default")]
    #[serde(rename = "default")]
    is_default: String,
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: write a starter config ────────────────────────────
        ConfigCommand::Init { name, force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    ),
                });
            }

            let mut profile = Profile::default();
            if let Some(ref host) = global.host {
                profile.host.clone_from(host);
            }
            if let Some(port) = global.port {
                profile.port = port;
            }

            let mut profiles = HashMap::new();
            profiles.insert(name.clone(), profile);
            let cfg = Config {
                default_profile: Some(name.clone()),
                profiles,
                ..Config::default()
            };
            config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("✓ Configuration written to {}", path.display());
                eprintln!("  Active profile: {name}");
                eprintln!("\n  Test it: cilia profile send");
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("<unrenderable: {e}>")),
                |c| c.default_profile.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── List ────────────────────────────────────────────────────
        ConfigCommand::List => {
            let cfg = config::load_config()?;
            if cfg.profiles.is_empty() {
                if !global.quiet {
                    eprintln!("No profiles configured. Run: cilia config init");
                }
                return Ok(());
            }

            let default = config::active_profile_name(global, &cfg);
            let mut rows: Vec<ProfileRow> = cfg
                .profiles
                .iter()
                .map(|(name, p)| ProfileRow {
                    name: name.clone(),
                    endpoint: format!("{}:{}", p.host, p.port),
                    scents: p.scents.len(),
                    groups: p.groups.len(),
                    is_default: if *name == default { "*".into() } else { String::new() },
                })
                .collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));

            let out = output::render_list(
                &global.output,
                &rows,
                ProfileRow::clone,
                |r| r.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
