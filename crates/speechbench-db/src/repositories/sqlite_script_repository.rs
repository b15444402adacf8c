//! `SQLite` implementation of the `ScriptRepository` port.

use async_trait::async_trait;
use sqlx::SqlitePool;

use speechbench_core::RepositoryError;
use speechbench_core::domain::{Script, ScriptId};
use speechbench_core::ports::ScriptRepository;

use super::row_mappers::{SCRIPT_ITEM_SELECT_COLUMNS, row_to_script_item};

fn storage_err(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

pub struct SqliteScriptRepository {
    pool: SqlitePool,
}

impl SqliteScriptRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScriptRepository for SqliteScriptRepository {
    async fn create_script(&self, name: String, input_texts: Vec<String>) -> Result<Script, RepositoryError> {
        let script_id = uuid::Uuid::new_v4();

        sqlx::query("INSERT INTO scripts (id, name) VALUES (?, ?)")
            .bind(script_id)
            .bind(&name)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        let mut items = Vec::with_capacity(input_texts.len());
        for (position, text) in input_texts.into_iter().enumerate() {
            let item_id = uuid::Uuid::new_v4();
            sqlx::query(
                "INSERT INTO script_items (id, script_id, position, text) VALUES (?, ?, ?, ?)",
            )
            .bind(item_id)
            .bind(script_id)
            .bind(position as i64)
            .bind(&text)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

            items.push(speechbench_core::domain::ScriptItem {
                id: item_id,
                script_id,
                position: position as i64,
                text,
            });
        }

        Ok(Script {
            id: script_id,
            name,
            items,
        })
    }

    async fn get_script(&self, script_id: ScriptId) -> Result<Script, RepositoryError> {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM scripts WHERE id = ?")
            .bind(script_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        let name = name.ok_or_else(|| RepositoryError::NotFound(format!("script {script_id}")))?;

        let query = format!(
            "SELECT {SCRIPT_ITEM_SELECT_COLUMNS} FROM script_items WHERE script_id = ? ORDER BY position"
        );
        let rows = sqlx::query(&query)
            .bind(script_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        let items = rows.iter().map(row_to_script_item).collect::<Result<Vec<_>, _>>()?;

        Ok(Script {
            id: script_id,
            name,
            items,
        })
    }

    async fn list_scripts(&self) -> Result<Vec<Script>, RepositoryError> {
        let rows: Vec<(uuid::Uuid, String)> = sqlx::query_as("SELECT id, name FROM scripts")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        let mut scripts = Vec::with_capacity(rows.len());
        for (id, name) in rows {
            let query = format!(
                "SELECT {SCRIPT_ITEM_SELECT_COLUMNS} FROM script_items WHERE script_id = ? ORDER BY position"
            );
            let item_rows = sqlx::query(&query)
                .bind(id)
                .fetch_all(&self.pool)
                .await
                .map_err(storage_err)?;
            let items = item_rows
                .iter()
                .map(row_to_script_item)
                .collect::<Result<Vec<_>, _>>()?;
            scripts.push(Script { id, name, items });
        }
        Ok(scripts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;

    #[tokio::test]
    async fn create_and_fetch_script_round_trips() {
        let pool = setup_test_database().await.unwrap();
        let repo = SqliteScriptRepository::new(pool);

        let script = repo
            .create_script(
                "greeting-set".to_string(),
                vec!["hello".to_string(), "world".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(script.item_count(), 2);

        let fetched = repo.get_script(script.id).await.unwrap();
        assert_eq!(fetched.input_texts(), vec!["hello", "world"]);
    }

    #[tokio::test]
    async fn missing_script_is_not_found() {
        let pool = setup_test_database().await.unwrap();
        let repo = SqliteScriptRepository::new(pool);
        let err = repo.get_script(uuid::Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}
