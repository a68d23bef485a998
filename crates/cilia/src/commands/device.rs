//! One-shot device commands: connect, send one command, disconnect.

use cilia_core::{Controller, Delivery, DeviceConfig, FanId, GroupTarget};

use crate::cli::{FanArgs, GlobalOpts, LightArgs, ScentArgs, TargetArgs};
use crate::error::CliError;

pub async fn light(
    controller: &Controller,
    args: LightArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let target = resolve_target(controller.config(), &args.target)?;
    let LightArgs {
        light,
        red,
        green,
        blue,
        ..
    } = args;

    let delivery = controller
        .oneshot(|c| async move { c.set_light(&target, light, red, green, blue).await })
        .await?;
    report(
        delivery,
        &format!("light {light} -> rgb({red}, {green}, {blue})"),
        global,
    )
}

pub async fn fan(
    controller: &Controller,
    args: FanArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let target = resolve_target(controller.config(), &args.target)?;
    let fan = parse_fan(&args.fan);
    let speed = args.speed;
    let what = format!("fan {fan} -> speed {speed}");

    let delivery = controller
        .oneshot(|c| async move { c.set_fan(&target, fan, speed).await })
        .await?;
    report(delivery, &what, global)
}

pub async fn scent(
    controller: &Controller,
    args: ScentArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let target = resolve_target(controller.config(), &args.target)?;
    let what = format!("scent {} -> speed {}", args.scent, args.speed);
    let ScentArgs { scent, speed, .. } = args;

    let delivery = controller
        .oneshot(|c| async move { c.set_scent(&target, scent, speed).await })
        .await?;
    report(delivery, &what, global)
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Turn `--group` values into a target. Each value is a numeric group ID
/// or a group name from the active profile; no values means all groups.
pub fn resolve_target(config: &DeviceConfig, args: &TargetArgs) -> Result<GroupTarget, CliError> {
    if args.groups.is_empty() {
        return Ok(GroupTarget::All);
    }

    let ids = args
        .groups
        .iter()
        .map(|group| {
            group
                .parse::<u8>()
                .ok()
                .or_else(|| config.profile.group_id(group))
                .ok_or_else(|| CliError::UnknownGroup {
                    name: group.clone(),
                    available: config.profile.groups.join(", "),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GroupTarget::groups(ids))
}

/// A fan argument that parses as a number is a slot index; anything
/// else names the scent the fan holds.
fn parse_fan(raw: &str) -> FanId {
    raw.parse::<u32>()
        .map_or_else(|_| FanId::from(raw), FanId::Index)
}

fn report(delivery: Delivery, what: &str, global: &GlobalOpts) -> Result<(), CliError> {
    match delivery {
        Delivery::Sent => {
            if !global.quiet {
                eprintln!("✓ Sent {what}");
            }
            Ok(())
        }
        Delivery::Dropped => Err(CliError::NotDelivered { what: what.into() }),
    }
}
