use crate::utils::error::{Result, RosterError};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Lower bound of the open range, stands in for "start unknown".
pub fn min_period_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap()
}

/// Upper bound of the open range, stands in for "still ongoing".
pub fn max_period_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap()
}

/// A closed-open interval `[start, end)` in UTC.
///
/// Invariant: `start < end`. Construction through `Period::new` is the
/// only way to obtain one, so every `Period` in the system is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(RosterError::InvalidRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// The default period when the caller supplies no dates.
    pub fn open_range() -> Self {
        Self {
            start: min_period_date(),
            end: max_period_date(),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// True iff the intervals share at least one instant. Touching
    /// intervals (`end == other.start`) do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True iff one interval ends exactly where the other starts.
    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.end == other.start || other.end == self.start
    }

    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True iff merging the two would lose no instants in between:
    /// they overlap or touch. Containment implies overlap here, since
    /// periods are never empty.
    pub fn mergeable(&self, other: &Self) -> bool {
        self.overlaps(other) || self.is_adjacent(other)
    }

    /// The smallest interval covering both. Only meaningful when
    /// `mergeable(other)` holds; the caller checks first.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A resolved individual: the opaque, externally-derived main key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualRef {
    pub mk: String,
}

/// A resolved group; the name doubles as the lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub name: String,
}

/// A stored affiliation of one individual with one group over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub mk: String,
    pub group: String,
    pub period: Period,
}

impl Enrollment {
    pub fn new(mk: &str, group: &str, period: Period) -> Self {
        Self {
            mk: mk.to_string(),
            group: group.to_string(),
            period,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn period(sy: i32, ey: i32) -> Period {
        Period::new(date(sy, 1, 1), date(ey, 1, 1)).unwrap()
    }

    #[test]
    fn test_new_rejects_empty_and_inverted() {
        assert!(Period::new(date(2012, 1, 1), date(2012, 1, 1)).is_err());
        assert!(Period::new(date(2013, 1, 1), date(2012, 1, 1)).is_err());
        assert!(Period::new(date(2012, 1, 1), date(2013, 1, 1)).is_ok());
    }

    #[test]
    fn test_overlaps() {
        let a = period(2010, 2012);
        let b = Period::new(date(2011, 6, 1), date(2013, 1, 1)).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        // touching is not overlapping
        let c = period(2012, 2014);
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));

        let d = period(2015, 2016);
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn test_adjacency() {
        let a = period(2010, 2012);
        let b = period(2012, 2014);
        assert!(a.is_adjacent(&b));
        assert!(b.is_adjacent(&a));

        let c = period(2013, 2015);
        assert!(!a.is_adjacent(&c));
    }

    #[test]
    fn test_contains() {
        let outer = period(2010, 2020);
        let inner = period(2012, 2014);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains(&outer));
    }

    #[test]
    fn test_mergeable_and_merge() {
        let a = period(2010, 2012);
        let b = Period::new(date(2011, 6, 1), date(2013, 1, 1)).unwrap();
        assert!(a.mergeable(&b));
        let merged = a.merge(&b);
        assert_eq!(merged.start(), date(2010, 1, 1));
        assert_eq!(merged.end(), date(2013, 1, 1));

        // adjacency merges into one continuous interval
        let c = period(2013, 2014);
        assert!(merged.mergeable(&c));
        let merged = merged.merge(&c);
        assert_eq!(merged.end(), date(2014, 1, 1));

        let far = period(2016, 2017);
        assert!(!merged.mergeable(&far));
    }

    #[test]
    fn test_open_range() {
        let open = Period::open_range();
        assert_eq!(open.start(), date(1900, 1, 1));
        assert_eq!(open.end(), date(2100, 1, 1));
    }
}
