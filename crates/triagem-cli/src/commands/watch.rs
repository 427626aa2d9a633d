//! Watch command handler
//!
//! Runs a full controller - change feed included - and reports a stats
//! line every time a reload lands, until Ctrl-C.

use anyhow::{Context, Result};
use chrono::Local;

use triagem_core::{RestStore, SyncController};

use crate::output::{Output, OutputFormat};

pub async fn run(store: RestStore, output: &Output) -> Result<()> {
    let mut controller = SyncController::new(store);
    let mut loading = controller.subscribe_loading();

    controller.start().await.context("Initial load failed")?;
    print_line(&controller, output).await;
    output.message("Watching for changes (Ctrl-C to stop)...");

    loop {
        tokio::select! {
            changed = loading.changed() => {
                if changed.is_err() {
                    break;
                }
                // Report once per completed reload, not on the
                // loading=true edge
                if !*loading.borrow_and_update() {
                    print_line(&controller, output).await;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    controller.stop();
    output.message("Stopped.");
    Ok(())
}

async fn print_line(controller: &SyncController<RestStore>, output: &Output) {
    let stats = controller.stats().await;
    match output.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&stats).unwrap());
        }
        _ => {
            println!(
                "[{}] total {} | pending {} | approved {} | rejected {} | approval {}%",
                Local::now().format("%H:%M:%S"),
                stats.total,
                stats.pending,
                stats.approved,
                stats.rejected,
                stats.approval_rate
            );
        }
    }
}
