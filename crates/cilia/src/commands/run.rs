//! `cilia run`: keep a supervised session open until Ctrl-C.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use cilia_core::supervisor::{self, ExponentialBackoff, PollInterval};
use cilia_core::{Controller, HostSignal};

use crate::cli::{GlobalOpts, RunArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    controller: &Controller,
    args: RunArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    let mut states = controller.connection_state();
    let color = output::should_color(&global.color);

    let handle = match args.interval {
        Some(secs) => supervisor::spawn(
            controller.clone(),
            PollInterval {
                interval: Duration::from_secs(secs.max(1)),
            },
            cancel.clone(),
        ),
        None => supervisor::spawn(
            controller.clone(),
            ExponentialBackoff {
                max_retries: args.max_retries,
                ..ExponentialBackoff::default()
            },
            cancel.clone(),
        ),
    };

    let url = controller.config().url()?.to_string();
    if !global.quiet {
        eprintln!("Supervising {url} (Ctrl-C to stop)");
    }

    let gave_up = loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break false;
            }
            () = handle.stopped() => break true,
            changed = states.changed() => {
                if changed.is_err() {
                    break false;
                }
                let state = *states.borrow_and_update();
                if !global.quiet {
                    eprintln!("device {}", output::state_label(state, color));
                }
            }
        }
    };

    handle.shutdown();
    handle.join().await;
    controller.on_host_signal(HostSignal::Stopping).await?;

    if gave_up {
        return Err(CliError::ConnectionFailed {
            url,
            source: "gave up reconnecting".into(),
        });
    }
    Ok(())
}
