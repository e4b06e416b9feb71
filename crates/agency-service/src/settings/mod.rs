//! System settings, data export and the activity log.

pub mod export;
pub mod service;

pub use export::{ExportFile, ExportFormat};
pub use service::SettingsService;
