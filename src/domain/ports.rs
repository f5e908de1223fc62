use crate::domain::model::{Enrollment, GroupRef, IndividualRef, Period};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Exclusive hold on one (mk, group) pair for the duration of a
/// read-modify-write sequence. Released on drop, on every exit path.
pub type PairLock = tokio::sync::OwnedMutexGuard<()>;

/// Lookup of individuals and groups by external key. Ownership of both
/// stays with the directory; the engine only resolves.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn resolve_individual(&self, mk: &str) -> Result<IndividualRef>;
    async fn resolve_group(&self, name: &str) -> Result<GroupRef>;
}

/// Durable mapping from (mk, group) to a set of enrollment periods.
///
/// Each method is atomic on its own. A caller that reads and then writes
/// based on what it read must hold the pair's lock across the whole
/// sequence; waiting for the lock is bounded, and a timeout surfaces a
/// retryable `Conflict`.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Serialize read-modify-write sequences for one pair. Pairs are
    /// independent; locking one never blocks another.
    async fn lock_pair(&self, mk: &str, group: &str) -> Result<PairLock>;

    /// All enrollments for the pair, ordered by period start.
    async fn list(&self, mk: &str, group: &str) -> Result<Vec<Enrollment>>;

    async fn insert(&self, enrollment: Enrollment) -> Result<Enrollment>;

    /// Delete `remove` and insert `add` for one pair as a single atomic
    /// unit. Fails with `Conflict` when any row in `remove` is no longer
    /// stored, i.e. the caller's read snapshot went stale.
    async fn replace(
        &self,
        mk: &str,
        group: &str,
        remove: &[Enrollment],
        add: Enrollment,
    ) -> Result<Enrollment>;

    /// Remove every enrollment of the pair whose period equals `period`
    /// exactly. Returns how many rows matched.
    async fn remove(&self, mk: &str, group: &str, period: &Period) -> Result<usize>;
}
