pub mod import;
pub mod schema;
pub mod store;

pub use import::{import_tick_file, ImportStats};
pub use store::{SqliteStore, TickStore};
