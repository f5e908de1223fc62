use crate::adapters::memory::{acquire_pair_lock, sort_by_start};
use crate::domain::model::{Enrollment, Period};
use crate::domain::ports::{EnrollmentStore, PairLock};
use crate::utils::error::{Result, RosterError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

type PairKey = (String, String);

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Enrollment store backed by a single JSON file, so CLI invocations see
/// each other's writes. The whole table is loaded at open and rewritten
/// after every successful mutation, under the same lock that guards the
/// in-memory copy; the rewrite goes through a temp file and a rename.
#[derive(Clone)]
pub struct FileStore {
    path: PathBuf,
    table: Arc<Mutex<HashMap<PairKey, Vec<Enrollment>>>>,
    pair_locks: Arc<Mutex<HashMap<PairKey, Arc<Mutex<()>>>>>,
    lock_timeout: Duration,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let table = if path.exists() {
            let data = fs::read_to_string(&path)?;
            let rows: Vec<Enrollment> = serde_json::from_str(&data)?;
            let mut table: HashMap<PairKey, Vec<Enrollment>> = HashMap::new();
            for row in rows {
                table
                    .entry((row.mk.clone(), row.group.clone()))
                    .or_default()
                    .push(row);
            }
            table
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            table: Arc::new(Mutex::new(table)),
            pair_locks: Arc::new(Mutex::new(HashMap::new())),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    fn persist(&self, table: &HashMap<PairKey, Vec<Enrollment>>) -> Result<()> {
        let mut rows: Vec<&Enrollment> = table.values().flatten().collect();
        rows.sort_by_key(|e| (e.mk.clone(), e.group.clone(), e.period.start()));
        let data = serde_json::to_string_pretty(&rows)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl EnrollmentStore for FileStore {
    async fn lock_pair(&self, mk: &str, group: &str) -> Result<PairLock> {
        acquire_pair_lock(&self.pair_locks, self.lock_timeout, mk, group).await
    }

    async fn list(&self, mk: &str, group: &str) -> Result<Vec<Enrollment>> {
        let table = self.table.lock().await;
        let mut rows = table
            .get(&(mk.to_string(), group.to_string()))
            .cloned()
            .unwrap_or_default();
        sort_by_start(&mut rows);
        Ok(rows)
    }

    async fn insert(&self, enrollment: Enrollment) -> Result<Enrollment> {
        let mut table = self.table.lock().await;
        let rows = table
            .entry((enrollment.mk.clone(), enrollment.group.clone()))
            .or_default();
        rows.push(enrollment.clone());
        sort_by_start(rows);
        self.persist(&table)?;
        Ok(enrollment)
    }

    async fn replace(
        &self,
        mk: &str,
        group: &str,
        remove: &[Enrollment],
        add: Enrollment,
    ) -> Result<Enrollment> {
        let mut table = self.table.lock().await;
        let rows = table
            .entry((mk.to_string(), group.to_string()))
            .or_default();

        let mut kept = rows.clone();
        for victim in remove {
            match kept.iter().position(|e| e == victim) {
                Some(idx) => {
                    kept.remove(idx);
                }
                None => {
                    return Err(RosterError::Conflict {
                        mk: mk.to_string(),
                        group: group.to_string(),
                    });
                }
            }
        }

        kept.push(add.clone());
        sort_by_start(&mut kept);
        *rows = kept;
        self.persist(&table)?;
        Ok(add)
    }

    async fn remove(&self, mk: &str, group: &str, period: &Period) -> Result<usize> {
        let mut table = self.table.lock().await;
        let Some(rows) = table.get_mut(&(mk.to_string(), group.to_string())) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|e| e.period != *period);
        let removed = before - rows.len();
        if removed > 0 {
            self.persist(&table)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn period(sy: i32, ey: i32) -> Period {
        Period::new(
            Utc.with_ymd_and_hms(sy, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(ey, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("enrollments.json");

        let store = FileStore::open(&path).unwrap();
        store
            .insert(Enrollment::new("mk1", "Example", period(2012, 2013)))
            .await
            .unwrap();
        store
            .insert(Enrollment::new("mk1", "Example", period(2015, 2016)))
            .await
            .unwrap();

        let reopened = FileStore::open(&path).unwrap();
        let rows = reopened.list("mk1", "Example").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period, period(2012, 2013));
    }

    #[tokio::test]
    async fn test_open_without_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("missing.json")).unwrap();
        assert!(store.list("mk1", "Example").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_persists_merged_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("enrollments.json");

        let store = FileStore::open(&path).unwrap();
        let old = store
            .insert(Enrollment::new("mk1", "Example", period(2012, 2013)))
            .await
            .unwrap();
        store
            .replace(
                "mk1",
                "Example",
                &[old],
                Enrollment::new("mk1", "Example", period(2012, 2014)),
            )
            .await
            .unwrap();

        let reopened = FileStore::open(&path).unwrap();
        let rows = reopened.list("mk1", "Example").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].period, period(2012, 2014));
    }

    #[tokio::test]
    async fn test_remove_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("enrollments.json");

        let store = FileStore::open(&path).unwrap();
        store
            .insert(Enrollment::new("mk1", "Example", period(2012, 2013)))
            .await
            .unwrap();
        let removed = store
            .remove("mk1", "Example", &period(2012, 2013))
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.list("mk1", "Example").await.unwrap().is_empty());
    }
}
