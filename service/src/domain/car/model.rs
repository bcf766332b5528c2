//! [`Model`] definitions.

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{car::company, catalog};
#[cfg(doc)]
use crate::domain::{car::Company, Car};

/// Model of [`Car`]s.
#[derive(Clone, Debug)]
pub struct Model {
    /// ID of this [`Model`].
    pub id: Id,

    /// Canonicalized [`catalog::Name`] of this [`Model`].
    pub name: catalog::Name,

    /// ID of the [`Company`] manufacturing this [`Model`], if known.
    pub company_id: Option<company::Id>,
}

/// ID of a [`Model`].
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
