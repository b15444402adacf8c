#![deny(unsafe_code)]

pub mod artifacts;
pub mod factory;
pub mod repositories;
pub mod setup;

pub use artifacts::FilesystemArtifactStore;
pub use factory::DbFactory;
#[cfg(any(test, feature = "test-utils"))]
pub use factory::TestDb;
pub use repositories::{SqliteRepository, SqliteScriptRepository};
pub use setup::setup_database;
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
