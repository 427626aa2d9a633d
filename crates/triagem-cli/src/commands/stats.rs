//! Stats command handler

use anyhow::Result;

use triagem_core::{region_label, RestStore, SyncController};

use crate::output::{Output, OutputFormat};

/// How many recent submissions to show under the totals
const RECENT_COUNT: usize = 5;

/// Print aggregate statistics plus the latest submissions
pub async fn run(store: RestStore, output: &Output) -> Result<()> {
    let controller = SyncController::new(store);
    controller.load().await?;

    let stats = controller.stats().await;
    output.print_stats(&stats);

    if output.format == OutputFormat::Human {
        let recent = controller.most_recent(RECENT_COUNT).await;
        if !recent.is_empty() {
            println!();
            println!("Recent submissions:");
            for app in &recent {
                println!(
                    "  {}  {} ({}) - {}",
                    app.submitted_at.format("%Y-%m-%d"),
                    app.name,
                    region_label(&app.region),
                    app.status.label()
                );
            }
        }
    }

    Ok(())
}
