//! Show command handler

use anyhow::{bail, Result};

use triagem_core::{RestStore, SyncController};

use crate::output::Output;

/// Show one application in full detail
///
/// Accepts a full id or an unambiguous prefix.
pub async fn run(store: RestStore, id: String, output: &Output) -> Result<()> {
    let controller = SyncController::new(store);
    controller.load().await?;

    let app = match controller.get(&id).await {
        Some(app) => app,
        None => {
            // Try prefix match against the loaded set
            let records = controller.records().await;
            let mut matches = records.iter().filter(|a| a.id.starts_with(&id));
            match (matches.next(), matches.next()) {
                (Some(app), None) => app.clone(),
                (Some(_), Some(_)) => bail!("Ambiguous id prefix: {}", id),
                _ => bail!("Application not found: {}", id),
            }
        }
    };

    output.print_application(&app);
    Ok(())
}
