//! Settings layer
//! - types.rs: Settings and parsing from configuration values
//! - source.rs: SettingsSource trait and the client-backed implementation
//! - cache.rs: coalescing per-document cache with global fallback
//! - error.rs: settings errors

pub mod cache;
pub mod error;
pub mod source;
pub mod types;

pub use cache::SettingsCache;
pub use error::SettingsError;
pub use source::{ClientSettingsSource, SettingsSource};
pub use types::Settings;
