use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{map_unique, RepoError, RepoResult};

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn count(&self) -> RepoResult<i64>;
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    async fn insert(&self, username: &str, password_hash: &str) -> RepoResult<User>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn count(&self) -> RepoResult<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;
        Ok(n)
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, username: &str, password_hash: &str) -> RepoResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique(e, || RepoError::DuplicateUsername(username.to_string())))
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn count(&self) -> RepoResult<i64> {
        Ok(self.rows.read().await.len() as i64)
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|u| u.username == username).cloned())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> RepoResult<User> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|u| u.username == username) {
            return Err(RepoError::DuplicateUsername(username.to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        rows.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_users_are_unique_by_name() {
        let repo = InMemoryUserRepository::new();
        let admin = repo.insert("admin", "hash").await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(
            repo.find_by_username("admin").await.unwrap().map(|u| u.id),
            Some(admin.id)
        );
        let err = repo.insert("admin", "other").await.unwrap_err();
        assert!(matches!(err, RepoError::DuplicateUsername(_)));
        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "admin".into(),
            password_hash: "secret-hash".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
