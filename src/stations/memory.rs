use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::model::{NewStation, Station, StationPatch};
use super::repo::StationRepository;
use crate::db::{RepoError, RepoResult};

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, Station>,
}

/// Process-local station table with the same uniqueness rules as the SQL one.
#[derive(Default)]
pub struct InMemoryStationRepository {
    inner: RwLock<Inner>,
}

impl InMemoryStationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StationRepository for InMemoryStationRepository {
    async fn count(&self) -> RepoResult<i64> {
        Ok(self.inner.read().await.rows.len() as i64)
    }

    async fn get(&self, id: i64) -> RepoResult<Option<Station>> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Station>> {
        let inner = self.inner.read().await;
        Ok(inner.rows.values().find(|s| s.code == code).cloned())
    }

    async fn insert(&self, station: NewStation) -> RepoResult<Station> {
        let mut inner = self.inner.write().await;
        if inner.rows.values().any(|s| s.code == station.code) {
            return Err(RepoError::DuplicateCode(station.code));
        }
        inner.next_id += 1;
        let id = inner.next_id;
        let row = station.into_station(id);
        inner.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, patch: StationPatch) -> RepoResult<Station> {
        let mut inner = self.inner.write().await;
        let row = inner.rows.get_mut(&id).ok_or(RepoError::NotFound(id))?;
        patch.apply(row);
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        self.inner
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound(id))
    }

    async fn scan(&self) -> RepoResult<Vec<Station>> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn list(&self, limit: i64) -> RepoResult<Vec<Station>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        let inner = self.inner.read().await;
        Ok(inner.rows.values().take(limit).cloned().collect())
    }
}
