// Adapters layer: concrete store implementations behind the domain ports.

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStore;
