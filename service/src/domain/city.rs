//! [`City`] definitions.

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::catalog;
#[cfg(doc)]
use crate::domain::{Car, User};

/// City cars are located in and [`User`]s live in.
#[derive(Clone, Debug)]
pub struct City {
    /// ID of this [`City`].
    pub id: Id,

    /// Canonicalized [`catalog::Name`] of this [`City`].
    pub name: catalog::Name,
}

/// ID of a [`City`].
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
