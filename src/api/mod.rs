//! Journal backend API.
//!
//! The backend performs transcription, sentiment scoring, and event
//! extraction; this module only speaks its HTTP interface.

pub mod client;
pub mod model;

pub use client::{JournalClient, UploadPayload};
pub use model::{Entry, EventSummary, TaggedEvent};
