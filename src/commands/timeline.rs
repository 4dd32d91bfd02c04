//! Browse the entry timeline.

use crate::api::JournalClient;
use crate::config::ReflectifyConfig;
use crate::ui::{self, TimelineViewer};

/// Fetches the timeline from the backend and opens the viewer.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the backend request fails
pub async fn handle_timeline() -> anyhow::Result<()> {
    let config = ReflectifyConfig::load_or_init()?;
    let client = JournalClient::new(&config.backend.base_url);

    match client.timeline().await {
        Ok(entries) => {
            tracing::info!("Loaded {} timeline entries", entries.len());
            TimelineViewer::new(entries)?.run()
        }
        Err(e) => {
            tracing::error!("Failed to fetch timeline: {e}");
            ui::error::show(&format!("Timeline Error:\n\n{e}"))?;
            Err(e)
        }
    }
}
