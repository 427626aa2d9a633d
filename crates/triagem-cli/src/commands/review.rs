//! Approve / reject / delete handlers
//!
//! All three go through the controller's confirmation-first path: the
//! cache (and the printed result) reflect what the server actually
//! stored, never an optimistic local guess.

use anyhow::{Context, Result};

use triagem_core::{RestStore, Status, SyncController};

use crate::output::Output;

/// Apply a review decision to an application
pub async fn run(store: RestStore, id: String, decision: Status, output: &Output) -> Result<()> {
    let controller = SyncController::new(store);

    let confirmed = controller
        .update_status(&id, decision)
        .await
        .with_context(|| format!("Failed to update application {}", id))?;

    output.success(&format!(
        "{}: {} ({})",
        confirmed.status.label(),
        confirmed.name,
        confirmed.id
    ));
    Ok(())
}

/// Delete an application
pub async fn delete(store: RestStore, id: String, output: &Output) -> Result<()> {
    let controller = SyncController::new(store);

    controller
        .delete(&id)
        .await
        .with_context(|| format!("Failed to delete application {}", id))?;

    output.success(&format!("Deleted {}", id));
    Ok(())
}
