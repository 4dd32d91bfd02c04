//! Browse the aggregate event-frequency view.

use crate::api::JournalClient;
use crate::config::ReflectifyConfig;
use crate::ui::{self, EventsViewer};

/// Fetches the event summary from the backend and opens the viewer.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the backend request fails
pub async fn handle_events() -> anyhow::Result<()> {
    let config = ReflectifyConfig::load_or_init()?;
    let client = JournalClient::new(&config.backend.base_url);

    match client.main_events().await {
        Ok(summary) => {
            tracing::info!(
                "Loaded event summary: {} main, {} total",
                summary.main_events.len(),
                summary.all_events.len()
            );
            EventsViewer::new(summary)?.run()
        }
        Err(e) => {
            tracing::error!("Failed to fetch events: {e}");
            ui::error::show(&format!("Events Error:\n\n{e}"))?;
            Err(e)
        }
    }
}
