//! GraphQL [`Query`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{domain::booking::Period, query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Car` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "car",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn car(
        id: api::car::Id,
        ctx: &Context,
    ) -> Result<api::Car, Error> {
        ctx.service()
            .execute(query::car::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| CarError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `Car`s available for rent in the specified `City`
    /// over the specified period.
    ///
    /// Both bounds of the period are rented days.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PAGINATION_AMBIGUOUS` - the pagination arguments are ambiguous;
    /// - `INVALID_PERIOD` - `rentFrom` is later than `rentTill`.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            city_id = %city_id,
            first = ?first,
            gql.name = "availableCars",
            last = ?last,
            otel.name = Self::SPAN_NAME,
            rent_from = ?rent_from,
            rent_till = ?rent_till,
        ),
    )]
    pub async fn available_cars(
        city_id: api::catalog::CityId,
        rent_from: Date,
        rent_till: Date,
        first: Option<i32>,
        after: Option<api::car::list::Cursor>,
        last: Option<i32>,
        before: Option<api::car::list::Cursor>,
        ctx: &Context,
    ) -> Result<api::car::list::Connection, Error> {
        const DEFAULT_PAGE_SIZE: i32 = 10;

        let period = Period::new(rent_from, rent_till)
            .ok_or_else(|| PeriodError::Invalid.into())
            .map_err(ctx.error())?;
        let filter = read::car::list::Filter {
            city_id: city_id.into(),
            period,
        };

        ctx.service()
            .execute(query::cars::Available::by(read::car::list::Selector {
                arguments: read::car::list::Arguments::new(
                    first,
                    after.map(Into::into),
                    last,
                    before.map(Into::into),
                    DEFAULT_PAGE_SIZE,
                )
                .ok_or_else(|| api::PaginationError::Ambiguous.into())
                .map_err(ctx.error())?,
                filter,
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|page| api::car::list::Connection::new(page, filter))
    }

    /// Lists all `City`s, ordered by name.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cities",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cities(
        ctx: &Context,
    ) -> Result<Vec<api::catalog::City>, Error> {
        ctx.service()
            .execute(query::catalog::Cities::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|cities| cities.into_iter().map(Into::into).collect())
    }

    /// Lists all `CarCompany`s, ordered by name.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "carCompanies",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn car_companies(
        ctx: &Context,
    ) -> Result<Vec<api::catalog::CarCompany>, Error> {
        ctx.service()
            .execute(query::catalog::Companies::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|companies| companies.into_iter().map(Into::into).collect())
    }

    /// Lists all `CarCategory`s, ordered by name.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "carCategories",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn car_categories(
        ctx: &Context,
    ) -> Result<Vec<api::catalog::CarCategory>, Error> {
        ctx.service()
            .execute(query::catalog::Categories::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|categories| categories.into_iter().map(Into::into).collect())
    }

    /// Lists `CarModel`s, optionally of a single `CarCompany`, ordered by
    /// name.
    #[tracing::instrument(
        skip_all,
        fields(
            company_id = ?company_id.as_ref().map(ToString::to_string),
            gql.name = "carModels",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn car_models(
        company_id: Option<api::catalog::CarCompanyId>,
        ctx: &Context,
    ) -> Result<Vec<api::catalog::CarModel>, Error> {
        ctx.service()
            .execute(query::catalog::Models::by(company_id.map(Into::into)))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|models| models.into_iter().map(Into::into).collect())
    }

    /// Lists the `Booking`s of the currently authenticated `User`, newest
    /// first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myBookings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_bookings(
        ctx: &Context,
    ) -> Result<Vec<api::Booking>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::bookings::OfUser::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|bookings| bookings.into_iter().map(Into::into).collect())
    }

    /// Returns the live `RentalIntent` of the currently authenticated `User`,
    /// if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myRentalIntent",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_rental_intent(
        ctx: &Context,
    ) -> Result<Option<api::intent::RentalIntent>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::intent::OfUser::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|intent| intent.map(Into::into))
    }

    /// Indicates whether the currently authenticated `User` is eligible to
    /// confirm a new `Booking` for the specified period.
    ///
    /// A `User` is blocked while they hold an active `Booking` overlapping
    /// the period or carry any unpaid fine.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_PERIOD` - `rentFrom` is later than `rentTill`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "canBook",
            otel.name = Self::SPAN_NAME,
            rent_from = ?rent_from,
            rent_till = ?rent_till,
        ),
    )]
    pub async fn can_book(
        rent_from: Date,
        rent_till: Date,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let period = Period::new(rent_from, rent_till)
            .ok_or_else(|| PeriodError::Invalid.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::user::CanBook {
                user_id: my_id.into(),
                period,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Builds the day schedule of pickups or returns for the `City` of the
    /// currently authenticated admin `User`.
    ///
    /// `onDate` defaults to today.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current `User` is not an admin;
    /// - `NO_ASSIGNED_CITY` - the current `User` has no `City` assigned.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "bookingSchedule",
            kind = ?kind,
            on_date = ?on_date,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn booking_schedule(
        kind: api::booking::ScheduleKind,
        on_date: Option<Date>,
        ctx: &Context,
    ) -> Result<Vec<api::Booking>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let me = ctx
            .service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())?;
        if !me.role.is_admin() {
            return Err(api::PrivilegeError::Admin.into());
        }
        let city_id = me
            .city_id
            .ok_or_else(|| ScheduleError::NoCity.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::bookings::Schedule::by(read::booking::Schedule {
                city_id,
                kind: kind.into(),
                on: on_date.unwrap_or_else(Date::today),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|bookings| bookings.into_iter().map(Into::into).collect())
    }
}

define_error! {
    enum BookingError {
        #[code = "BOOKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Booking` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum CarError {
        #[code = "CAR_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Car` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum PeriodError {
        #[code = "INVALID_PERIOD"]
        #[status = BAD_REQUEST]
        #[message = "`rentFrom` day cannot be later than `rentTill` day"]
        Invalid,
    }
}

define_error! {
    enum ScheduleError {
        #[code = "NO_ASSIGNED_CITY"]
        #[status = CONFLICT]
        #[message = "current `User` has no `City` assigned"]
        NoCity,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
