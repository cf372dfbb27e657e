//! Persistence layer — SQLite-backed storage for profiles and the catalog.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use traits::Store;
