//! Terminal views.
//!
//! The client has a fixed set of named views; exactly one is active at a
//! time, selected by the command line rather than implicit UI state.

pub mod error;
pub mod events;
pub mod recorder;
pub mod timeline;

pub use error::ErrorScreen;
pub use events::EventsViewer;
pub use recorder::{RecorderCommand, RecorderTui};
pub use timeline::TimelineViewer;

/// The top-level views of the journal client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Recording session with live level metering.
    Recorder,
    /// Chronological entry timeline.
    Timeline,
    /// Aggregate event-frequency view.
    Events,
}
