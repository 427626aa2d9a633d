//! List command handler

use anyhow::Result;

use triagem_core::{RecordFilter, RestStore, Status, SyncController};

use crate::output::Output;

/// Fetch all applications and print the ones matching the filters
pub async fn run(
    store: RestStore,
    status: Option<Status>,
    region: Option<String>,
    search: Option<String>,
    output: &Output,
) -> Result<()> {
    let controller = SyncController::new(store);
    controller.load().await?;

    let filter = RecordFilter {
        search: search.unwrap_or_default(),
        status,
        region,
    };

    let total = controller.records().await.len();
    let shown = controller.filtered(&filter).await;
    output.print_applications(&shown, total);
    Ok(())
}
