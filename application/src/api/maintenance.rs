//! Maintenance-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{
    api::{self, booking, car},
    Context,
};

/// Append-only log entry of a `Car` entering or leaving maintenance.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context, name = "MaintenanceRecord")]
pub struct Record {
    /// Unique identifier of this `MaintenanceRecord`.
    pub id: Id,

    /// ID of the serviced `Car`.
    pub car_id: car::Id,

    /// ID of the admin `User` who recorded this entry.
    pub admin_id: api::user::Id,

    /// Kind of this entry.
    pub kind: Kind,

    /// Free-text description of the service reason or outcome.
    pub description: booking::Description,

    /// `DateTime` when this entry was recorded.
    pub created_at: DateTime,
}

impl From<domain::MaintenanceRecord> for Record {
    fn from(record: domain::MaintenanceRecord) -> Self {
        let domain::MaintenanceRecord {
            id,
            car_id,
            admin_id,
            kind,
            description,
            created_at,
        } = record;
        Self {
            id: id.into(),
            car_id: car_id.into(),
            admin_id: admin_id.into(),
            kind: kind.into(),
            description: description.into(),
            created_at: created_at.coerce(),
        }
    }
}

/// Unique identifier of a `MaintenanceRecord`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::maintenance::Id)]
#[into(domain::maintenance::Id)]
#[graphql(name = "MaintenanceRecordId", transparent)]
pub struct Id(Uuid);

/// Kind of a `MaintenanceRecord` entry.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "MaintenanceKind")]
pub enum Kind {
    /// The `Car` was pulled out of service.
    Entry,

    /// The `Car` was returned to service.
    Exit,
}

impl From<domain::maintenance::Kind> for Kind {
    fn from(kind: domain::maintenance::Kind) -> Self {
        match kind {
            domain::maintenance::Kind::Entry => Self::Entry,
            domain::maintenance::Kind::Exit => Self::Exit,
        }
    }
}
