//! Application configuration.

pub mod file;

pub use file::{AudioConfig, BackendConfig, ReflectifyConfig};
