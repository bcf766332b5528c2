//! [`MaintenanceRecord`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{booking, car, user};
#[cfg(doc)]
use crate::domain::{Car, User};

/// Append-only log entry of a [`Car`] entering or leaving maintenance.
#[derive(Clone, Debug)]
pub struct MaintenanceRecord {
    /// ID of this [`MaintenanceRecord`].
    pub id: Id,

    /// ID of the serviced [`Car`].
    pub car_id: car::Id,

    /// ID of the admin [`User`] who recorded this entry.
    pub admin_id: user::Id,

    /// [`Kind`] of this entry.
    pub kind: Kind,

    /// Free-text description of the service reason or outcome.
    pub description: booking::Description,

    /// [`DateTime`] when this entry was recorded.
    pub created_at: CreationDateTime,
}

/// ID of a [`MaintenanceRecord`].
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

define_kind! {
    #[doc = "Kind of a [`MaintenanceRecord`] entry."]
    enum Kind {
        #[doc = "The [`Car`] was pulled out of service."]
        Entry = 1,

        #[doc = "The [`Car`] was returned to service."]
        Exit = 2,
    }
}

/// [`DateTime`] when a [`MaintenanceRecord`] was recorded.
pub type CreationDateTime = DateTimeOf<(MaintenanceRecord, unit::Creation)>;
