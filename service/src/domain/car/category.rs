//! [`Category`] definitions.

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::catalog;
#[cfg(doc)]
use crate::domain::Car;

/// Category of [`Car`]s (hatchback, sedan, SUV and so on).
#[derive(Clone, Debug)]
pub struct Category {
    /// ID of this [`Category`].
    pub id: Id,

    /// Canonicalized [`catalog::Name`] of this [`Category`].
    pub name: catalog::Name,
}

/// ID of a [`Category`].
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
