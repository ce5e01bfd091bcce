pub mod blob;
pub mod error;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use blob::FsBlobStore;
pub use error::StorageError;
pub use sqlite::SqliteStore;
pub use traits::*;
