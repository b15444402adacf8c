//! Script repository port (§4.1).
//!
//! Scripts are the reusable input workloads (ordered text prompts) that a
//! run is executed against. Kept separate from `Repository` since scripts
//! are managed independently of runs (created once, reused across many).

use async_trait::async_trait;

use crate::domain::{Script, ScriptId};
use crate::error::RepositoryError;

#[async_trait]
pub trait ScriptRepository: Send + Sync {
    async fn create_script(&self, name: String, input_texts: Vec<String>) -> Result<Script, RepositoryError>;

    async fn get_script(&self, script_id: ScriptId) -> Result<Script, RepositoryError>;

    async fn list_scripts(&self) -> Result<Vec<Script>, RepositoryError>;
}
