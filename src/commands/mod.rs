//! Application command handlers.
//!
//! One submodule per command:
//! - `record`: interactive recording session with upload
//! - `upload`: upload a pre-recorded WAV file
//! - `timeline`: browse the entry timeline
//! - `events`: browse the aggregate event-frequency view
//! - `list_devices`: list available audio input devices
//! - `config`: open the configuration file in an editor
//! - `logs`: display recent log entries

pub mod config;
pub mod events;
pub mod list_devices;
pub mod logs;
pub mod record;
pub mod timeline;
pub mod upload;

pub use config::handle_config;
pub use events::handle_events;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use record::handle_record;
pub use timeline::handle_timeline;
pub use upload::handle_upload;
