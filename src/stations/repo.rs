use async_trait::async_trait;
use sqlx::PgPool;

use super::model::{NewStation, Station, StationPatch};
use crate::db::{map_unique, RepoError, RepoResult};

/// Narrow view of the station table. `scan` and `list` return rows in id
/// order, which is also insertion order.
#[async_trait]
pub trait StationRepository: Send + Sync {
    async fn count(&self) -> RepoResult<i64>;
    async fn get(&self, id: i64) -> RepoResult<Option<Station>>;
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Station>>;
    async fn insert(&self, station: NewStation) -> RepoResult<Station>;
    async fn update(&self, id: i64, patch: StationPatch) -> RepoResult<Station>;
    async fn delete(&self, id: i64) -> RepoResult<()>;
    async fn scan(&self) -> RepoResult<Vec<Station>>;
    async fn list(&self, limit: i64) -> RepoResult<Vec<Station>>;
}

const COLUMNS: &str =
    "id, code, name, latitude, longitude, nb_bikes, nb_e_bikes, nb_free_docks, status";

#[derive(Clone)]
pub struct PgStationRepository {
    db: PgPool,
}

impl PgStationRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StationRepository for PgStationRepository {
    async fn count(&self) -> RepoResult<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stations")
            .fetch_one(&self.db)
            .await?;
        Ok(n)
    }

    async fn get(&self, id: i64) -> RepoResult<Option<Station>> {
        let row = sqlx::query_as::<_, Station>(&format!(
            "SELECT {COLUMNS} FROM stations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Station>> {
        let row = sqlx::query_as::<_, Station>(&format!(
            "SELECT {COLUMNS} FROM stations WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn insert(&self, s: NewStation) -> RepoResult<Station> {
        let code = s.code.clone();
        sqlx::query_as::<_, Station>(&format!(
            r#"
            INSERT INTO stations
                (code, name, latitude, longitude, nb_bikes, nb_e_bikes, nb_free_docks, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(s.code)
        .bind(s.name)
        .bind(s.latitude)
        .bind(s.longitude)
        .bind(s.nb_bikes)
        .bind(s.nb_e_bikes)
        .bind(s.nb_free_docks)
        .bind(s.status)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique(e, || RepoError::DuplicateCode(code)))
    }

    async fn update(&self, id: i64, p: StationPatch) -> RepoResult<Station> {
        sqlx::query_as::<_, Station>(&format!(
            r#"
            UPDATE stations SET
                name          = COALESCE($2, name),
                latitude      = COALESCE($3, latitude),
                longitude     = COALESCE($4, longitude),
                nb_bikes      = COALESCE($5, nb_bikes),
                nb_e_bikes    = COALESCE($6, nb_e_bikes),
                nb_free_docks = COALESCE($7, nb_free_docks),
                status        = COALESCE($8, status)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(p.name)
        .bind(p.latitude)
        .bind(p.longitude)
        .bind(p.nb_bikes)
        .bind(p.nb_e_bikes)
        .bind(p.nb_free_docks)
        .bind(p.status)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepoError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let res = sqlx::query("DELETE FROM stations WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    async fn scan(&self) -> RepoResult<Vec<Station>> {
        let rows = sqlx::query_as::<_, Station>(&format!(
            "SELECT {COLUMNS} FROM stations ORDER BY id"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list(&self, limit: i64) -> RepoResult<Vec<Station>> {
        let rows = sqlx::query_as::<_, Station>(&format!(
            "SELECT {COLUMNS} FROM stations ORDER BY id LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
