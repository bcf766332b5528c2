//! [`RentalIntent`]-related definitions.

use common::{Date, DateTime};
use juniper::GraphQLObject;
use service::domain;

use crate::{api::catalog, Context};

/// In-progress search of the authenticated `User` for a `Car` to rent.
///
/// At most one lives per `User`; resubmitting dates overwrites it.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct RentalIntent {
    /// First requested rental day.
    pub rent_from: Date,

    /// Last requested rental day.
    pub rent_till: Date,

    /// ID of the `City` to pick a `Car` up in.
    pub city_id: catalog::CityId,

    /// `DateTime` when this `RentalIntent` was (re)submitted.
    pub created_at: DateTime,
}

impl From<domain::RentalIntent> for RentalIntent {
    fn from(intent: domain::RentalIntent) -> Self {
        let domain::RentalIntent {
            user_id: _,
            period,
            city_id,
            created_at,
        } = intent;
        Self {
            rent_from: period.from(),
            rent_till: period.till(),
            city_id: city_id.into(),
            created_at: created_at.coerce(),
        }
    }
}
