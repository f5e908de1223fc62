use crate::core::{EnrollmentStore, IdentityDirectory};
use crate::domain::model::{max_period_date, min_period_date, Enrollment, Period};
use crate::utils::error::{Result, RosterError};
use crate::utils::validation::parse_period_date;
use chrono::{DateTime, Utc};

/// Orchestrates enrollment mutations: validates and defaults the input
/// dates, resolves both keys through the directory, and decides between
/// insert, merge and force-insert against the store.
pub struct RosterEngine<D: IdentityDirectory, S: EnrollmentStore> {
    directory: D,
    store: S,
}

impl<D: IdentityDirectory, S: EnrollmentStore> RosterEngine<D, S> {
    pub fn new(directory: D, store: S) -> Self {
        Self { directory, store }
    }

    /// Record that `mk` belonged to `group` over the given period.
    ///
    /// Omitted dates default to the open range. With `force` unset,
    /// stored periods that overlap or touch the candidate are collapsed
    /// into a single covering enrollment; with `force` set the candidate
    /// is inserted as-is, overlaps included, and no merge happens.
    pub async fn enroll(
        &self,
        mk: &str,
        group: &str,
        from_date: Option<&str>,
        to_date: Option<&str>,
        force: bool,
    ) -> Result<Enrollment> {
        let candidate = resolve_period(from_date, to_date)?;

        let individual = self.directory.resolve_individual(mk).await?;
        let group = self.directory.resolve_group(group).await?;

        tracing::debug!(
            "enroll {} in {} over [{}, {}) force={}",
            individual.mk,
            group.name,
            candidate.start().to_rfc3339(),
            candidate.end().to_rfc3339(),
            force
        );

        // Exclusive hold on the pair for the whole read-modify-write;
        // released on every exit path when the guard drops.
        let _pair = self.store.lock_pair(&individual.mk, &group.name).await?;

        if force {
            let enrollment = Enrollment::new(&individual.mk, &group.name, candidate);
            let stored = self.store.insert(enrollment).await?;
            tracing::info!("force-enrolled {} in {}", individual.mk, group.name);
            return Ok(stored);
        }

        let existing = self.store.list(&individual.mk, &group.name).await?;
        let (union, absorbed) = merge_closure(candidate, existing);

        if absorbed.is_empty() {
            let enrollment = Enrollment::new(&individual.mk, &group.name, union);
            let stored = self.store.insert(enrollment).await?;
            tracing::info!("enrolled {} in {}", individual.mk, group.name);
            Ok(stored)
        } else {
            let merged = Enrollment::new(&individual.mk, &group.name, union);
            let stored = self
                .store
                .replace(&individual.mk, &group.name, &absorbed, merged)
                .await?;
            tracing::info!(
                "enrolled {} in {}, merged {} existing period(s)",
                individual.mk,
                group.name,
                absorbed.len()
            );
            Ok(stored)
        }
    }

    /// Remove the enrollments of the pair whose period equals the given
    /// bounds exactly. Omitted dates default to the open range. Returns
    /// how many rows were removed; zero matches is a `NotFound`.
    pub async fn withdraw(
        &self,
        mk: &str,
        group: &str,
        from_date: Option<&str>,
        to_date: Option<&str>,
    ) -> Result<usize> {
        let period = resolve_period(from_date, to_date)?;

        let individual = self.directory.resolve_individual(mk).await?;
        let group = self.directory.resolve_group(group).await?;

        let _pair = self.store.lock_pair(&individual.mk, &group.name).await?;

        let removed = self
            .store
            .remove(&individual.mk, &group.name, &period)
            .await?;
        if removed == 0 {
            return Err(RosterError::NotFound {
                key: format!(
                    "enrollment of {} in {} during [{}, {})",
                    individual.mk,
                    group.name,
                    period.start().to_rfc3339(),
                    period.end().to_rfc3339()
                ),
            });
        }

        tracing::info!(
            "withdrew {} enrollment(s) of {} from {}",
            removed,
            individual.mk,
            group.name
        );
        Ok(removed)
    }

    /// The stored periods of the pair, ordered by start.
    pub async fn enrollments(&self, mk: &str, group: &str) -> Result<Vec<Enrollment>> {
        let individual = self.directory.resolve_individual(mk).await?;
        let group = self.directory.resolve_group(group).await?;
        self.store.list(&individual.mk, &group.name).await
    }
}

/// Parse and default the boundary dates, then validate the range.
/// Input-shape failures happen here, before any directory or store
/// access.
fn resolve_period(from_date: Option<&str>, to_date: Option<&str>) -> Result<Period> {
    let start: DateTime<Utc> = match from_date {
        Some(literal) => parse_period_date(literal)?,
        None => min_period_date(),
    };
    let end: DateTime<Utc> = match to_date {
        Some(literal) => parse_period_date(literal)?,
        None => max_period_date(),
    };
    Period::new(start, end)
}

/// Fold the candidate together with every stored period it can merge
/// with, transitively: absorbing one period can widen the union enough
/// to reach periods the original candidate never touched. Returns the
/// covering union and the stored enrollments it absorbed.
fn merge_closure(candidate: Period, existing: Vec<Enrollment>) -> (Period, Vec<Enrollment>) {
    let mut union = candidate;
    let mut absorbed = Vec::new();
    let mut remaining = existing;

    loop {
        let (touching, rest): (Vec<_>, Vec<_>) = remaining
            .into_iter()
            .partition(|e| union.mergeable(&e.period));
        if touching.is_empty() {
            break;
        }
        for enrollment in &touching {
            union = union.merge(&enrollment.period);
        }
        absorbed.extend(touching);
        remaining = rest;
    }

    (union, absorbed)
}
