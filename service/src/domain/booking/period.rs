//! Rental [`Period`] definitions.

use common::Date;
use derive_more::Display;

#[cfg(doc)]
use crate::domain::Booking;

/// Inclusive range of calendar days a [`Booking`] spans.
///
/// A whole day is the unit of rental, so both bounds are part of the rented
/// interval.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[display("{from}..={till}")]
pub struct Period {
    /// First rented day.
    from: Date,

    /// Last rented day.
    till: Date,
}

impl Period {
    /// Creates a new [`Period`] if the given bounds form a valid range
    /// (`from` not later than `till`).
    #[must_use]
    pub fn new(from: Date, till: Date) -> Option<Self> {
        (from <= till).then_some(Self { from, till })
    }

    /// Returns the first rented day of this [`Period`].
    #[must_use]
    pub fn from(&self) -> Date {
        self.from
    }

    /// Returns the last rented day of this [`Period`].
    #[must_use]
    pub fn till(&self) -> Date {
        self.till
    }

    /// Indicates whether this [`Period`] intersects the `other` one.
    ///
    /// Closed intervals `[a, b]` and `[c, d]` intersect iff `a <= d` and
    /// `c <= b`, so two rentals sharing a single day do conflict.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.from <= other.till && other.from <= self.till
    }

    /// Indicates whether this [`Period`] starts strictly after the given
    /// `date`.
    #[must_use]
    pub fn starts_after(&self, date: Date) -> bool {
        self.from > date
    }
}

#[cfg(test)]
mod spec {
    use common::Date;

    use super::Period;

    fn date(s: &str) -> Date {
        Date::from_iso8601(s).unwrap()
    }

    fn period(from: &str, till: &str) -> Period {
        Period::new(date(from), date(till)).unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(Period::new(date("2024-01-12"), date("2024-01-10")).is_none());
        assert!(Period::new(date("2024-01-10"), date("2024-01-10")).is_some());
    }

    #[test]
    fn overlaps_is_closed_interval_intersection() {
        let jan_10_12 = period("2024-01-10", "2024-01-12");

        assert!(jan_10_12.overlaps(&period("2024-01-10", "2024-01-12")));
        assert!(jan_10_12.overlaps(&period("2024-01-12", "2024-01-15")));
        assert!(jan_10_12.overlaps(&period("2024-01-08", "2024-01-10")));
        assert!(jan_10_12.overlaps(&period("2024-01-01", "2024-01-31")));
        assert!(jan_10_12.overlaps(&period("2024-01-11", "2024-01-11")));

        assert!(!jan_10_12.overlaps(&period("2024-01-13", "2024-01-15")));
        assert!(!jan_10_12.overlaps(&period("2024-01-01", "2024-01-09")));
    }

    #[test]
    fn overlaps_is_symmetric() {
        let a = period("2024-01-10", "2024-01-12");
        let b = period("2024-01-12", "2024-01-20");

        assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn starts_after() {
        let p = period("2024-01-10", "2024-01-12");

        assert!(p.starts_after(date("2024-01-09")));
        assert!(!p.starts_after(date("2024-01-10")));
        assert!(!p.starts_after(date("2024-01-11")));
    }
}
