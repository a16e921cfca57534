//! SQLite Credential Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{
    Credential, CredentialRepositoryPort, NewCredential, RepositoryError,
};

/// SQLite Credential Repository
pub struct SqliteCredentialRepository {
    pool: DbPool,
}

impl SqliteCredentialRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, sql: &str) -> Result<Option<Credential>, RepositoryError> {
        let row: Option<CredentialRow> = sqlx::query_as(sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(Credential::try_from).transpose()
    }
}

#[derive(FromRow)]
struct CredentialRow {
    id: i64,
    platform: String,
    api_key: String,
    is_default: bool,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = RepositoryError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        Ok(Credential {
            id: row.id,
            platform: row.platform,
            key: row.api_key,
            is_default: row.is_default,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&row.updated_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl CredentialRepositoryPort for SqliteCredentialRepository {
    async fn create(&self, credential: NewCredential) -> Result<Credential, RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if credential.is_default {
            sqlx::query("UPDATE api_keys SET is_default = 0, updated_at = ? WHERE is_default = 1")
                .bind(&now)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
        }

        let result = sqlx::query(
            r#"
            INSERT INTO api_keys (platform, api_key, is_default, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&credential.platform)
        .bind(&credential.key)
        .bind(credential.is_default)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("api key {}", id)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Credential>, RepositoryError> {
        let row: Option<CredentialRow> = sqlx::query_as(
            "SELECT id, platform, api_key, is_default, created_at, updated_at FROM api_keys WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(Credential::try_from).transpose()
    }

    async fn find_default(&self) -> Result<Option<Credential>, RepositoryError> {
        self.find_one(
            "SELECT id, platform, api_key, is_default, created_at, updated_at FROM api_keys WHERE is_default = 1 ORDER BY id LIMIT 1",
        )
        .await
    }

    async fn find_oldest(&self) -> Result<Option<Credential>, RepositoryError> {
        self.find_one(
            "SELECT id, platform, api_key, is_default, created_at, updated_at FROM api_keys ORDER BY id LIMIT 1",
        )
        .await
    }

    async fn find_all(&self) -> Result<Vec<Credential>, RepositoryError> {
        let rows: Vec<CredentialRow> = sqlx::query_as(
            "SELECT id, platform, api_key, is_default, created_at, updated_at FROM api_keys ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(Credential::try_from).collect()
    }

    async fn set_default(&self, id: i64) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        sqlx::query("UPDATE api_keys SET is_default = 0, updated_at = ? WHERE is_default = 1")
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let result = sqlx::query("UPDATE api_keys SET is_default = 1, updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("api key {}", id)));
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn repo() -> SqliteCredentialRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteCredentialRepository::new(pool)
    }

    fn new_key(key: &str, is_default: bool) -> NewCredential {
        NewCredential {
            platform: "minimax".to_string(),
            key: key.to_string(),
            is_default,
        }
    }

    #[tokio::test]
    async fn test_empty_repository() {
        let repo = repo().await;
        assert!(repo.find_default().await.unwrap().is_none());
        assert!(repo.find_oldest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_default_and_oldest() {
        let repo = repo().await;
        let first = repo.create(new_key("sk-first-000001", false)).await.unwrap();
        let second = repo.create(new_key("sk-second-00002", true)).await.unwrap();

        assert_eq!(repo.find_oldest().await.unwrap().unwrap().id, first.id);
        assert_eq!(repo.find_default().await.unwrap().unwrap().id, second.id);
    }

    #[tokio::test]
    async fn test_single_default() {
        let repo = repo().await;
        let first = repo.create(new_key("sk-first-000001", true)).await.unwrap();
        let second = repo.create(new_key("sk-second-00002", true)).await.unwrap();

        let defaults: Vec<i64> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .filter(|c| c.is_default)
            .map(|c| c.id)
            .collect();
        assert_eq!(defaults, vec![second.id]);

        repo.set_default(first.id).await.unwrap();
        assert_eq!(repo.find_default().await.unwrap().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_set_default_unknown_rolls_back() {
        let repo = repo().await;
        let first = repo.create(new_key("sk-first-000001", true)).await.unwrap();

        let result = repo.set_default(999).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
        assert_eq!(repo.find_default().await.unwrap().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_delete_default_falls_back_to_oldest() {
        let repo = repo().await;
        let first = repo.create(new_key("sk-first-000001", false)).await.unwrap();
        let second = repo.create(new_key("sk-second-00002", true)).await.unwrap();

        assert!(repo.delete(second.id).await.unwrap());
        assert!(!repo.delete(second.id).await.unwrap());

        assert!(repo.find_by_id(second.id).await.unwrap().is_none());
        assert!(repo.find_default().await.unwrap().is_none());
        assert_eq!(repo.find_oldest().await.unwrap().unwrap().id, first.id);
    }
}
