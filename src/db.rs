use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Failures surfaced by the record store, whichever backend sits behind it.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("a station with code {0:?} already exists")]
    DuplicateCode(String),

    #[error("user {0:?} already exists")]
    DuplicateUsername(String),

    #[error("station {0} not found")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("connect to database")
}

pub async fn migrate(db: &PgPool) {
    if let Err(e) = sqlx::migrate!("./migrations").run(db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }
}

/// Maps a unique-constraint violation to `on_conflict`, everything else to `Database`.
pub(crate) fn map_unique(err: sqlx::Error, on_conflict: impl FnOnce() -> RepoError) -> RepoError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => on_conflict(),
        _ => RepoError::Database(err),
    }
}
