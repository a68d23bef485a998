//! Profile subcommand handlers.

use std::fmt::Write as _;

use tabled::Tabled;

use cilia_core::{Controller, Delivery, GameProfile};

use crate::cli::{GlobalOpts, ProfileArgs, ProfileCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "ID")]
    id: usize,
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Tabled)]
struct LightRow {
    #[tabled(rename = "Fixture")]
    fixture: usize,
    #[tabled(rename = "RGB")]
    rgb: String,
    #[tabled(rename = "White")]
    white: u8,
    #[tabled(rename = "Packed")]
    packed: String,
}

pub async fn handle(
    controller: &Controller,
    args: ProfileArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        // ── Show: what `LoadProfile` will carry ─────────────────────
        ProfileCommand::Show => {
            let profile = &controller.config().profile;
            let out = output::render_single(
                &global.output,
                &profile.to_document(),
                |_| detail(profile),
                |doc| doc.profile_name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Send ────────────────────────────────────────────────────
        ProfileCommand::Send => {
            // With auto-load on, the connect itself delivers the profile.
            let delivery = controller
                .oneshot(|c| async move {
                    if c.config().load_profile {
                        Ok(Delivery::Sent)
                    } else {
                        c.load_profile().await
                    }
                })
                .await?;
            if delivery == Delivery::Dropped {
                return Err(CliError::NotDelivered {
                    what: "profile".into(),
                });
            }
            if !global.quiet {
                eprintln!("✓ Profile '{}' loaded", controller.config().profile.name);
            }
            Ok(())
        }
    }
}

fn detail(profile: &GameProfile) -> String {
    let slots = |names: &[String]| -> Vec<SlotRow> {
        names
            .iter()
            .enumerate()
            .map(|(id, name)| SlotRow {
                id,
                name: name.clone(),
            })
            .collect()
    };
    let lights: Vec<LightRow> = profile
        .lights
        .iter()
        .enumerate()
        .map(|(i, color)| LightRow {
            fixture: i + 1,
            rgb: color.to_string(),
            white: color.white,
            packed: format!("{:#010X}", color.to_hex()),
        })
        .collect();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Profile: {}  (default group {})",
        profile.name, profile.default_group
    );
    let _ = writeln!(out, "\nScents\n{}", output::render_table(&slots(&profile.scents)));
    let _ = writeln!(out, "\nGroups\n{}", output::render_table(&slots(&profile.groups)));
    let _ = write!(out, "\nLights\n{}", output::render_table(&lights));
    out
}
