pub mod db;
pub mod entities;
pub mod migrations;
pub mod seaorm;
pub mod snapshot;
pub mod storage;

pub use seaorm::SeaOrmStorage;
pub use snapshot::StorageSnapshot;
pub use storage::{NewRequestLog, Storage, StorageError, StorageResult, UsageAggregate};
