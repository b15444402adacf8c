//! Script and ScriptItem domain types — immutable batch-mode inputs.
//!
//! The core treats these as read-only at run-creation time; authoring and
//! persistence of scripts themselves is an external collaborator's concern.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a [`Script`].
pub type ScriptId = Uuid;

/// One entry in an ordered input corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptItem {
    pub id: Uuid,
    pub script_id: ScriptId,
    pub position: i64,
    pub text: String,
}

/// An ordered list of input strings identified by an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub id: ScriptId,
    pub name: String,
    pub items: Vec<ScriptItem>,
}

impl Script {
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Ordered input texts, suitable for feeding directly into `CreateRun`.
    #[must_use]
    pub fn input_texts(&self) -> Vec<String> {
        let mut items = self.items.clone();
        items.sort_by_key(|i| i.position);
        items.into_iter().map(|i| i.text).collect()
    }
}
