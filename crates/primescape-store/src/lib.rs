//! SQLite cache of decomposed records.

pub mod cache;
pub mod ingest;
pub mod query;
pub mod schema;

pub use cache::{decompose_cached, CacheStats, CachedBatch};
pub use ingest::save_records;
pub use query::{load_records, record_count, DEFAULT_BATCH_LIMIT};
pub use schema::{init_schema, SCHEMA_VERSION};
