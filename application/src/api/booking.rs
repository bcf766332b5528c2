//! [`Booking`]-related definitions.

use common::{Date, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLObject,
    GraphQLScalar,
};
use service::{domain, query, read, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, catalog, scalar},
    AsError, Context, Error,
};

/// A confirmed reservation of a `Car` for a period of days.
#[derive(Clone, Debug, From)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// [`domain::Booking`] representing this [`Booking`].
    booking: OnceCell<domain::Booking>,
}

impl From<domain::Booking> for Booking {
    fn from(booking: domain::Booking) -> Self {
        Self {
            id: booking.id.into(),
            booking: OnceCell::new_with(Some(booking)),
        }
    }
}

impl Booking {
    /// Returns the [`domain::Booking`] representing this [`Booking`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Booking`] doesn't exist.
    async fn booking(&self, ctx: &Context) -> Result<&domain::Booking, Error> {
        let id = self.id.into();
        self.booking
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::booking::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|b| {
                        future::ready(b.ok_or_else(|| {
                            api::query::BookingError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A confirmed reservation of a `Car` for a period of days.
#[graphql_object(context = Context)]
impl Booking {
    /// Unique identifier of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The rented `Car`.
    ///
    /// `null` once the `Car` has been removed from the fleet (possible only
    /// for fully historical `Booking`s).
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.car",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn car(&self, ctx: &Context) -> Result<Option<api::Car>, Error> {
        Ok(self.booking(ctx).await?.car_id.map(|id| {
            #[expect(
                unsafe_code,
                reason = "`Booking` loaded from repository guarantees `Car` \
                          existence"
            )]
            unsafe {
                api::Car::new_unchecked(id)
            }
        }))
    }

    /// ID of the renting `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.userId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn user_id(&self, ctx: &Context) -> Result<api::user::Id, Error> {
        Ok(self.booking(ctx).await?.user_id.into())
    }

    /// Status of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.booking(ctx).await?.status.into())
    }

    /// First rented day of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.rentFrom",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn rent_from(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.booking(ctx).await?.period.from())
    }

    /// Last rented day of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.rentTill",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn rent_till(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.booking(ctx).await?.period.till())
    }

    /// ID of the `City` the `Car` is picked up in, if it still exists.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.pickupCityId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn pickup_city_id(
        &self,
        ctx: &Context,
    ) -> Result<Option<catalog::CityId>, Error> {
        Ok(self.booking(ctx).await?.pickup_city_id.map(Into::into))
    }

    /// ID of the `City` the `Car` is returned in, if it still exists.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.deliveryCityId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn delivery_city_id(
        &self,
        ctx: &Context,
    ) -> Result<Option<catalog::CityId>, Error> {
        Ok(self.booking(ctx).await?.delivery_city_id.map(Into::into))
    }

    /// `DateTime` when this `Booking` was confirmed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.booking(ctx).await?.created_at.coerce())
    }

    /// `DateTime` when the `Car` was picked up, if it was.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.takenAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn taken_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.booking(ctx).await?.taken_at.map(|at| at.coerce()))
    }

    /// `DateTime` when the `Car` was returned and reviewed, if it was.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.returnedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn returned_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.booking(ctx).await?.returned_at.map(|at| at.coerce()))
    }

    /// Return review of this `Booking`, recorded on return.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.review",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn review(
        &self,
        ctx: &Context,
    ) -> Result<Option<Review>, Error> {
        Ok(self.booking(ctx).await?.review.clone().map(Into::into))
    }
}

/// Unique identifier of a `Booking`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::booking::Id)]
#[into(domain::booking::Id)]
#[graphql(name = "BookingId", transparent)]
pub struct Id(Uuid);

/// Status of a `Booking`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "BookingStatus")]
pub enum Status {
    /// The `Booking` is confirmed and holds its period.
    Confirmed,

    /// The `Booking` was cancelled before its period started.
    Cancelled,
}

impl From<domain::booking::Status> for Status {
    fn from(status: domain::booking::Status) -> Self {
        match status {
            domain::booking::Status::Confirmed => Self::Confirmed,
            domain::booking::Status::Cancelled => Self::Cancelled,
        }
    }
}

/// Return review of a `Booking`, recorded by an admin when the `Car` comes
/// back.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context, name = "BookingReview")]
pub struct Review {
    /// Whether the `Car` was returned on the agreed date.
    pub on_said_date: bool,

    /// Whether the `Car` was returned at the agreed time.
    pub on_said_time: bool,

    /// Whether the `Car` was returned in a proper condition.
    pub proper_condition: bool,

    /// Free-text notes of the reviewing admin.
    pub description: Description,

    /// Fine assessed against the renter, if any.
    pub fine: Option<Fine>,
}

impl From<domain::booking::Review> for Review {
    fn from(review: domain::booking::Review) -> Self {
        let domain::booking::Review {
            on_said_date,
            on_said_time,
            proper_condition,
            description,
            fine,
        } = review;
        Self {
            on_said_date,
            on_said_time,
            proper_condition,
            description: description.into(),
            fine: fine.map(Into::into),
        }
    }
}

/// Fine liability assessed against the renter of a single `Booking`.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct Fine {
    /// Assessed amount.
    pub amount: Money,

    /// Whether this `Fine` has been settled.
    pub paid: bool,
}

impl From<domain::booking::Fine> for Fine {
    fn from(fine: domain::booking::Fine) -> Self {
        let domain::booking::Fine { amount, paid } = fine;
        Self { amount, paid }
    }
}

/// Free-text description of a review or a maintenance record.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "Description",
    with = scalar::Via::<domain::booking::Description>,
)]
pub struct Description(domain::booking::Description);

/// Signal of the payment collaborator accompanying a paid operation.
#[derive(Clone, Copy, Debug, GraphQLInputObject)]
#[graphql(name = "PaymentConfirmation")]
pub struct Payment {
    /// Whether the payment was captured.
    pub is_captured: bool,

    /// Captured amount.
    pub amount: Money,
}

impl From<Payment> for domain::PaymentConfirmation {
    fn from(payment: Payment) -> Self {
        let Payment {
            is_captured,
            amount,
        } = payment;
        Self {
            is_captured,
            amount,
        }
    }
}

/// Kind of an admin day schedule.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
pub enum ScheduleKind {
    /// Active `Booking`s whose `Car` is to be picked up on the given day.
    Pickups,

    /// Active `Booking`s whose pickup day has passed without the `Car`
    /// being taken.
    PickupsOverdue,

    /// Active `Booking`s whose `Car` is to be returned on the given day.
    Returns,

    /// Active `Booking`s whose return day has passed with the `Car` still
    /// out.
    ReturnsOverdue,
}

impl From<ScheduleKind> for read::booking::ScheduleKind {
    fn from(kind: ScheduleKind) -> Self {
        match kind {
            ScheduleKind::Pickups => Self::Pickups,
            ScheduleKind::PickupsOverdue => Self::PickupsOverdue,
            ScheduleKind::Returns => Self::Returns,
            ScheduleKind::ReturnsOverdue => Self::ReturnsOverdue,
        }
    }
}
