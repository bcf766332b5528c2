//! [`Car`] definitions.

pub mod category;
pub mod company;
pub mod model;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::city;
#[cfg(doc)]
use crate::domain::{Booking, City, MaintenanceRecord};

pub use self::{category::Category, company::Company, model::Model};

/// Car available for rent.
#[derive(Clone, Debug)]
pub struct Car {
    /// ID of this [`Car`].
    pub id: Id,

    /// Unique canonicalized [`Plate`] of this [`Car`].
    pub plate: Plate,

    /// ID of the [`Company`] manufacturing this [`Car`], if known.
    ///
    /// Nulled when the referred [`Company`] is removed.
    pub company_id: Option<company::Id>,

    /// ID of the [`Category`] of this [`Car`], if known.
    ///
    /// Nulled when the referred [`Category`] is removed.
    pub category_id: Option<category::Id>,

    /// ID of the [`Model`] of this [`Car`], if known.
    ///
    /// Nulled when the referred [`Model`] is removed.
    pub model_id: Option<model::Id>,

    /// [`Color`] of this [`Car`].
    pub color: Color,

    /// [`Mileage`] of this [`Car`].
    pub mileage: Mileage,

    /// Price of renting this [`Car`] for one day.
    pub price_per_day: Money,

    /// Minimum rent to be paid for this [`Car`] regardless of the rental
    /// length.
    pub min_rent: Money,

    /// Deposit to be paid at the beginning of the rent.
    pub deposit: Money,

    /// ID of the [`City`] this [`Car`] is currently located in.
    ///
    /// Nulled when the referred [`City`] is removed.
    pub city_id: Option<city::Id>,

    /// Indicator whether this [`Car`] is in service.
    ///
    /// Flipped to `false` by an [`MaintenanceRecord`] entry, back to `true`
    /// by a maintenance exit. A [`Car`] out of service never appears in
    /// availability results, regardless of [`Booking`]s.
    pub is_available: bool,

    /// [`DateTime`] when this [`Car`] was added to the fleet.
    pub created_at: CreationDateTime,
}

/// ID of a [`Car`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Registration plate of a [`Car`].
///
/// Canonicalized the same way as a [`catalog::Name`]: spaces stripped,
/// letters upper-cased. The canonical form is the uniqueness key of the
/// fleet.
///
/// [`catalog::Name`]: crate::domain::catalog::Name
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Plate(String);

impl Plate {
    /// Creates a new [`Plate`] without canonicalizing or checking it.
    ///
    /// # Safety
    ///
    /// The provided `plate` must already be in the canonical form.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(plate: impl Into<String>) -> Self {
        Self(plate.into())
    }

    /// Creates a new [`Plate`], canonicalizing the given `raw` input.
    ///
    /// [`None`] is returned if the canonical form is not a plausible
    /// registration plate.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let canonical = raw
            .as_ref()
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_uppercase)
            .collect::<String>();
        ((4..=16).contains(&canonical.len())
            && canonical.chars().all(|c| c.is_ascii_alphanumeric()))
        .then_some(Self(canonical))
    }
}

impl FromStr for Plate {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Plate`")
    }
}

/// Color of a [`Car`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Color(String);

impl Color {
    /// Creates a new [`Color`] without checking it.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `color` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(color: impl Into<String>) -> Self {
        Self(color.into())
    }

    /// Creates a new [`Color`] if the given `color` is valid.
    #[must_use]
    pub fn new(color: impl Into<String>) -> Option<Self> {
        let color = color.into();
        Self::check(&color).then_some(Self(color))
    }

    /// Checks whether the given `color` is a valid [`Color`].
    fn check(color: impl AsRef<str>) -> bool {
        let color = color.as_ref();
        color.trim() == color && !color.is_empty() && color.len() <= 64
    }
}

impl FromStr for Color {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Color`")
    }
}

/// Mileage of a [`Car`], in kilometers.
pub type Mileage = u32;

/// [`DateTime`] when a [`Car`] was added to the fleet.
pub type CreationDateTime = DateTimeOf<(Car, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Plate;

    #[test]
    fn plate_canonicalizes() {
        assert_eq!(
            Plate::new("dl 01 ab 1234").unwrap().to_string(),
            "DL01AB1234",
        );
        assert_eq!(
            Plate::new("DL01AB1234").unwrap(),
            Plate::new(" dl01ab1234 ").unwrap(),
        );
    }

    #[test]
    fn plate_rejects_invalid() {
        assert!(Plate::new("").is_none());
        assert!(Plate::new("ab").is_none());
        assert!(Plate::new("dl-01-ab-1234").is_none());
        assert!(Plate::new("a".repeat(17)).is_none());
    }
}
