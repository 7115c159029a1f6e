pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::SqliteStore;
pub use config::DirectoryConfig;
pub use crate::core::directory::DirectoryService;
pub use utils::error::{DirectoryError, Result};
