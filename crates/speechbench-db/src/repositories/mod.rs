//! Repository implementations.

mod row_mappers;
mod sqlite_repository;
mod sqlite_script_repository;

pub use sqlite_repository::SqliteRepository;
pub use sqlite_script_repository::SqliteScriptRepository;
