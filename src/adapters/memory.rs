use crate::domain::model::{Enrollment, GroupRef, IndividualRef, Period};
use crate::domain::ports::{EnrollmentStore, IdentityDirectory, PairLock};
use crate::utils::error::{Result, RosterError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

type PairKey = (String, String);

fn pair_key(mk: &str, group: &str) -> PairKey {
    (mk.to_string(), group.to_string())
}

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// In-process enrollment store. One lock guards the table, so each call
/// is atomic; read-modify-write sequences additionally take a per-pair
/// lock through `lock_pair`, with a bounded wait. `replace` re-validates
/// the caller's read snapshot as a second line of defense and surfaces
/// `Conflict` when it went stale.
#[derive(Clone)]
pub struct MemoryStore {
    table: Arc<Mutex<HashMap<PairKey, Vec<Enrollment>>>>,
    pair_locks: Arc<Mutex<HashMap<PairKey, Arc<Mutex<()>>>>>,
    lock_timeout: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_lock_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            table: Arc::new(Mutex::new(HashMap::new())),
            pair_locks: Arc::new(Mutex::new(HashMap::new())),
            lock_timeout,
        }
    }
}

pub(crate) fn sort_by_start(rows: &mut [Enrollment]) {
    rows.sort_by_key(|e| (e.period.start(), e.period.end()));
}

pub(crate) async fn acquire_pair_lock(
    pair_locks: &Mutex<HashMap<PairKey, Arc<Mutex<()>>>>,
    lock_timeout: Duration,
    mk: &str,
    group: &str,
) -> Result<PairLock> {
    let lock = {
        let mut locks = pair_locks.lock().await;
        locks.entry(pair_key(mk, group)).or_default().clone()
    };

    tokio::time::timeout(lock_timeout, lock.lock_owned())
        .await
        .map_err(|_| RosterError::Conflict {
            mk: mk.to_string(),
            group: group.to_string(),
        })
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn lock_pair(&self, mk: &str, group: &str) -> Result<PairLock> {
        acquire_pair_lock(&self.pair_locks, self.lock_timeout, mk, group).await
    }

    async fn list(&self, mk: &str, group: &str) -> Result<Vec<Enrollment>> {
        let table = self.table.lock().await;
        let mut rows = table.get(&pair_key(mk, group)).cloned().unwrap_or_default();
        sort_by_start(&mut rows);
        Ok(rows)
    }

    async fn insert(&self, enrollment: Enrollment) -> Result<Enrollment> {
        let mut table = self.table.lock().await;
        let rows = table
            .entry(pair_key(&enrollment.mk, &enrollment.group))
            .or_default();
        rows.push(enrollment.clone());
        sort_by_start(rows);
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
        let rows = table.entry(pair_key(mk, group)).or_default();

        // Every row the caller read must still be present, once per
        // requested removal, or its snapshot is stale.
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
        Ok(add)
    }

    async fn remove(&self, mk: &str, group: &str, period: &Period) -> Result<usize> {
        let mut table = self.table.lock().await;
        let Some(rows) = table.get_mut(&pair_key(mk, group)) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|e| e.period != *period);
        Ok(before - rows.len())
    }
}

/// Seeded lookup of known individuals and groups. Misses report the
/// offending key.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    individuals: HashSet<String>,
    groups: HashSet<String>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_individual(&mut self, mk: &str) {
        self.individuals.insert(mk.to_string());
    }

    pub fn add_group(&mut self, name: &str) {
        self.groups.insert(name.to_string());
    }
}

#[async_trait]
impl IdentityDirectory for MemoryDirectory {
    async fn resolve_individual(&self, mk: &str) -> Result<IndividualRef> {
        if self.individuals.contains(mk) {
            Ok(IndividualRef { mk: mk.to_string() })
        } else {
            Err(RosterError::NotFound { key: mk.to_string() })
        }
    }

    async fn resolve_group(&self, name: &str) -> Result<GroupRef> {
        if self.groups.contains(name) {
            Ok(GroupRef {
                name: name.to_string(),
            })
        } else {
            Err(RosterError::NotFound {
                key: name.to_string(),
            })
        }
    }
}
