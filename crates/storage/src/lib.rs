#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryProgressStore, ProgressStore, Storage, StorageError};
pub use sqlite::{SqliteInitError, SqliteProgressStore};
