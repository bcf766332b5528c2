//! GraphQL [`Mutation`]s definitions.

use common::{Date, Money};
use juniper::graphql_object;
use service::{
    command,
    domain::{self, booking::Period},
    Command as _,
};

use crate::{api, define_error, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `User` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LOGIN_OCCUPIED` - provided `UserLogin` is occupied by another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            city_id = ?city_id.as_ref().map(ToString::to_string),
            email = ?email,
            gql.name = "createUser",
            login = %login,
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user(
        name: api::user::Name,
        login: api::user::Login,
        password: api::user::Password,
        email: Option<api::user::Email>,
        city_id: Option<api::catalog::CityId>,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let user = ctx
            .service()
            .execute(command::CreateUser {
                name: name.into(),
                login: login.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                email: email.map(Into::into),
                city_id: city_id.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByUserId(user.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Creates a new `UserSession` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials does not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createUserSession",
            login = %login,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        login: api::user::Login,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByCredentials {
                login: login.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Submits the `RentalIntent` of the current `User`, overwriting any
    /// previous one.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CITY_NOT_EXISTS` - the `City` with the provided ID does not exist;
    /// - `INVALID_PERIOD` - `rentFrom` is later than `rentTill`;
    /// - `PERIOD_IN_PAST` - the requested period starts in the past.
    #[tracing::instrument(
        skip_all,
        fields(
            city_id = %city_id,
            gql.name = "submitRentalIntent",
            otel.name = Self::SPAN_NAME,
            rent_from = ?rent_from,
            rent_till = ?rent_till,
        ),
    )]
    pub async fn submit_rental_intent(
        city_id: api::catalog::CityId,
        rent_from: Date,
        rent_till: Date,
        ctx: &Context,
    ) -> Result<api::intent::RentalIntent, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let period = Period::new(rent_from, rent_till)
            .ok_or_else(|| api::query::PeriodError::Invalid.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::SubmitRentalIntent {
                initiator_id: my_id.into(),
                period,
                city_id: city_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Confirms a `Booking` of the specified `Car` over the specified period
    /// for the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_ALREADY_BOOKED` - the `Car` has an active `Booking`
    ///                          intersecting the period;
    /// - `CAR_NOT_AVAILABLE` - the `Car` is out of service;
    /// - `CAR_NOT_EXISTS` - the `Car` with the provided ID does not exist;
    /// - `FINE_PENDING` - the current `User` carries an unpaid fine;
    /// - `INVALID_PERIOD` - `rentFrom` is later than `rentTill`;
    /// - `PAYMENT_NOT_CAPTURED` - the payment was not captured;
    /// - `PERIOD_IN_PAST` - the requested period starts in the past;
    /// - `USER_ALREADY_BOOKED` - the current `User` has an active `Booking`
    ///                           intersecting the period;
    /// - `USER_NOT_VERIFIED` - the identity of the current `User` is not
    ///                         verified.
    #[tracing::instrument(
        skip_all,
        fields(
            car_id = %car_id,
            gql.name = "confirmBooking",
            otel.name = Self::SPAN_NAME,
            rent_from = ?rent_from,
            rent_till = ?rent_till,
        ),
    )]
    pub async fn confirm_booking(
        car_id: api::car::Id,
        rent_from: Date,
        rent_till: Date,
        payment: api::booking::Payment,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let period = Period::new(rent_from, rent_till)
            .ok_or_else(|| api::query::PeriodError::Invalid.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::ConfirmBooking {
                initiator_id: my_id.into(),
                car_id: car_id.into(),
                period,
                payment: payment.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the `Booking` with the provided ID.
    ///
    /// A `Booking` may be cancelled by its `User` or an admin, and only
    /// before its rental period starts.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_ACTIVE` - the `Booking` is cancelled or returned
    ///                          already;
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the provided ID does not
    ///                          exist;
    /// - `NOT_PERMITTED` - the current `User` is neither the renter nor an
    ///                     admin;
    /// - `RENTAL_ALREADY_STARTED` - the rental period has already started.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cancelBooking",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_booking(
        id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CancelBooking {
                initiator_id: my_id.into(),
                booking_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `Car` of the `Booking` with the provided ID as picked up.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_ACTIVE` - the `Booking` is cancelled, returned, or its
    ///                          `Car` is taken already;
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the provided ID does not
    ///                          exist;
    /// - `NOT_ADMIN` - the current `User` is not an admin;
    /// - `PICKUP_TOO_EARLY` - the rental period has not started yet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "markCarTaken",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn mark_car_taken(
        id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::MarkCarTaken {
                initiator_id: my_id.into(),
                booking_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Records the return review of the `Booking` with the provided ID,
    /// optionally assessing a fine.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ALREADY_RETURNED` - the `Booking` is reviewed already;
    /// - `BOOKING_NOT_ACTIVE` - the `Booking` is cancelled;
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the provided ID does not
    ///                          exist;
    /// - `CAR_NOT_TAKEN` - the `Car` was never picked up;
    /// - `NEGATIVE_FINE` - the assessed fine is negative;
    /// - `NOT_ADMIN` - the current `User` is not an admin.
    #[tracing::instrument(
        skip_all,
        fields(
            description = %description,
            fine = ?fine.as_ref().map(ToString::to_string),
            gql.name = "reviewCarReturn",
            id = %id,
            on_said_date = %on_said_date,
            on_said_time = %on_said_time,
            otel.name = Self::SPAN_NAME,
            proper_condition = %proper_condition,
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    pub async fn review_car_return(
        id: api::booking::Id,
        on_said_date: bool,
        on_said_time: bool,
        proper_condition: bool,
        description: api::booking::Description,
        fine: Option<Money>,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::ReviewCarReturn {
                initiator_id: my_id.into(),
                booking_id: id.into(),
                on_said_date,
                on_said_time,
                proper_condition,
                description: description.into(),
                fine,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Settles the fine of the `Booking` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the provided ID does not
    ///                          exist;
    /// - `NO_UNSETTLED_FINE` - the `Booking` carries no unpaid fine;
    /// - `NOT_PERMITTED` - the current `User` is neither the renter nor an
    ///                     admin;
    /// - `PAYMENT_NOT_CAPTURED` - the payment was not captured;
    /// - `WRONG_AMOUNT` - the captured amount differs from the assessed one.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "settleFine",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn settle_fine(
        id: api::booking::Id,
        payment: api::booking::Payment,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::SettleFine {
                initiator_id: my_id.into(),
                booking_id: id.into(),
                payment: payment.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Adds a new `Car` to the fleet.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current `User` is not an admin;
    /// - `PLATE_OCCUPIED` - the provided `CarPlate` is occupied by another
    ///                      `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            category_id = ?category_id.as_ref().map(ToString::to_string),
            city_id = ?city_id.as_ref().map(ToString::to_string),
            color = %color,
            company_id = ?company_id.as_ref().map(ToString::to_string),
            deposit = deposit.to_string(),
            gql.name = "createCar",
            mileage = %mileage,
            min_rent = min_rent.to_string(),
            model_id = ?model_id.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
            plate = %plate,
            price_per_day = price_per_day.to_string(),
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    pub async fn create_car(
        plate: api::car::Plate,
        color: api::car::Color,
        mileage: i32,
        price_per_day: Money,
        min_rent: Money,
        deposit: Money,
        company_id: Option<api::catalog::CarCompanyId>,
        category_id: Option<api::catalog::CarCategoryId>,
        model_id: Option<api::catalog::CarModelId>,
        city_id: Option<api::catalog::CityId>,
        ctx: &Context,
    ) -> Result<api::Car, Error> {
        let mileage = mileage.try_into().map_err(AsError::into_error)?;
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateCar {
                initiator_id: my_id.into(),
                plate: plate.into(),
                company_id: company_id.map(Into::into),
                category_id: category_id.map(Into::into),
                model_id: model_id.map(Into::into),
                color: color.into(),
                mileage,
                price_per_day,
                min_rent,
                deposit,
                city_id: city_id.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the `Car` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` with the provided ID does not exist;
    /// - `NOT_ADMIN` - the current `User` is not an admin;
    /// - `PLATE_OCCUPIED` - the provided `CarPlate` is occupied by another
    ///                      `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            category_id = ?category_id.as_ref().map(ToString::to_string),
            city_id = ?city_id.as_ref().map(ToString::to_string),
            color = %color,
            company_id = ?company_id.as_ref().map(ToString::to_string),
            deposit = deposit.to_string(),
            gql.name = "updateCar",
            id = %id,
            mileage = %mileage,
            min_rent = min_rent.to_string(),
            model_id = ?model_id.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
            plate = %plate,
            price_per_day = price_per_day.to_string(),
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    pub async fn update_car(
        id: api::car::Id,
        plate: api::car::Plate,
        color: api::car::Color,
        mileage: i32,
        price_per_day: Money,
        min_rent: Money,
        deposit: Money,
        company_id: Option<api::catalog::CarCompanyId>,
        category_id: Option<api::catalog::CarCategoryId>,
        model_id: Option<api::catalog::CarModelId>,
        city_id: Option<api::catalog::CityId>,
        ctx: &Context,
    ) -> Result<api::Car, Error> {
        let mileage = mileage.try_into().map_err(AsError::into_error)?;
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateCar {
                initiator_id: my_id.into(),
                car_id: id.into(),
                plate: plate.into(),
                company_id: company_id.map(Into::into),
                category_id: category_id.map(Into::into),
                model_id: model_id.map(Into::into),
                color: color.into(),
                mileage,
                price_per_day,
                min_rent,
                deposit,
                city_id: city_id.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Removes the `Car` with the provided ID from the fleet.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_HAS_BOOKINGS` - the `Car` has an active `Booking` starting
    ///                        today or later;
    /// - `CAR_NOT_EXISTS` - the `Car` with the provided ID does not exist;
    /// - `NOT_ADMIN` - the current `User` is not an admin.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteCar",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_car(
        id: api::car::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteCar {
                initiator_id: my_id.into(),
                car_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Creates a new `City` with the provided name.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NAME_OCCUPIED` - the provided `CatalogName` is occupied by another
    ///                     `City`;
    /// - `NOT_SUPER_ADMIN` - the current `User` is not a super admin.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createCity",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_city(
        name: api::catalog::Name,
        ctx: &Context,
    ) -> Result<api::catalog::City, Error> {
        let my_id = ctx.current_session().await?.user_id;

        let entry = ctx
            .service()
            .execute(command::CreateCatalogEntry {
                initiator_id: my_id.into(),
                kind: domain::catalog::Kind::City,
                name: name.into(),
                company_id: None,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        match entry {
            domain::catalog::Entry::City(city) => Ok(city.into()),
            domain::catalog::Entry::CarCompany(_)
            | domain::catalog::Entry::CarCategory(_)
            | domain::catalog::Entry::CarModel(_) => {
                Err(Error::internal(&"created entry is not a `City`"))
            }
        }
    }

    /// Creates a new `CarCompany` with the provided name.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NAME_OCCUPIED` - the provided `CatalogName` is occupied by another
    ///                     `CarCompany`;
    /// - `NOT_SUPER_ADMIN` - the current `User` is not a super admin.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createCarCompany",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_car_company(
        name: api::catalog::Name,
        ctx: &Context,
    ) -> Result<api::catalog::CarCompany, Error> {
        let my_id = ctx.current_session().await?.user_id;

        let entry = ctx
            .service()
            .execute(command::CreateCatalogEntry {
                initiator_id: my_id.into(),
                kind: domain::catalog::Kind::CarCompany,
                name: name.into(),
                company_id: None,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        match entry {
            domain::catalog::Entry::CarCompany(company) => Ok(company.into()),
            domain::catalog::Entry::City(_)
            | domain::catalog::Entry::CarCategory(_)
            | domain::catalog::Entry::CarModel(_) => Err(Error::internal(
                &"created entry is not a `CarCompany`",
            )),
        }
    }

    /// Creates a new `CarCategory` with the provided name.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NAME_OCCUPIED` - the provided `CatalogName` is occupied by another
    ///                     `CarCategory`;
    /// - `NOT_SUPER_ADMIN` - the current `User` is not a super admin.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createCarCategory",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_car_category(
        name: api::catalog::Name,
        ctx: &Context,
    ) -> Result<api::catalog::CarCategory, Error> {
        let my_id = ctx.current_session().await?.user_id;

        let entry = ctx
            .service()
            .execute(command::CreateCatalogEntry {
                initiator_id: my_id.into(),
                kind: domain::catalog::Kind::CarCategory,
                name: name.into(),
                company_id: None,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        match entry {
            domain::catalog::Entry::CarCategory(category) => {
                Ok(category.into())
            }
            domain::catalog::Entry::City(_)
            | domain::catalog::Entry::CarCompany(_)
            | domain::catalog::Entry::CarModel(_) => Err(Error::internal(
                &"created entry is not a `CarCategory`",
            )),
        }
    }

    /// Creates a new `CarModel` with the provided name, optionally tied to a
    /// `CarCompany`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NAME_OCCUPIED` - the provided `CatalogName` is occupied by another
    ///                     `CarModel`;
    /// - `NOT_SUPER_ADMIN` - the current `User` is not a super admin.
    #[tracing::instrument(
        skip_all,
        fields(
            company_id = ?company_id.as_ref().map(ToString::to_string),
            gql.name = "createCarModel",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_car_model(
        name: api::catalog::Name,
        company_id: Option<api::catalog::CarCompanyId>,
        ctx: &Context,
    ) -> Result<api::catalog::CarModel, Error> {
        let my_id = ctx.current_session().await?.user_id;

        let entry = ctx
            .service()
            .execute(command::CreateCatalogEntry {
                initiator_id: my_id.into(),
                kind: domain::catalog::Kind::CarModel,
                name: name.into(),
                company_id: company_id.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        match entry {
            domain::catalog::Entry::CarModel(model) => Ok(model.into()),
            domain::catalog::Entry::City(_)
            | domain::catalog::Entry::CarCompany(_)
            | domain::catalog::Entry::CarCategory(_) => {
                Err(Error::internal(&"created entry is not a `CarModel`"))
            }
        }
    }

    /// Renames the referred catalog entity.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ENTRY_NOT_EXISTS` - the referred catalog entity does not exist;
    /// - `NAME_OCCUPIED` - the provided `CatalogName` is occupied by another
    ///                     entity of the same kind;
    /// - `NOT_SUPER_ADMIN` - the current `User` is not a super admin.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "renameCatalogEntry",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn rename_catalog_entry(
        entry: api::catalog::EntryRefInput,
        name: api::catalog::Name,
        ctx: &Context,
    ) -> Result<api::catalog::Entry, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::RenameCatalogEntry {
                initiator_id: my_id.into(),
                entry: entry.into(),
                name: name.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the referred catalog entity.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ENTRY_IN_USE` - the referred catalog entity is still referenced by
    ///                    a `Car`, a `User`, or a `CarModel`;
    /// - `ENTRY_NOT_EXISTS` - the referred catalog entity does not exist;
    /// - `NOT_SUPER_ADMIN` - the current `User` is not a super admin.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteCatalogEntry",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_catalog_entry(
        entry: api::catalog::EntryRefInput,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteCatalogEntry {
                initiator_id: my_id.into(),
                entry: entry.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Pulls the `Car` with the provided ID out of service.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ALREADY_IN_MAINTENANCE` - the `Car` is out of service already;
    /// - `CAR_NOT_EXISTS` - the `Car` with the provided ID does not exist;
    /// - `NOT_ADMIN` - the current `User` is not an admin.
    #[tracing::instrument(
        skip_all,
        fields(
            car_id = %car_id,
            description = %description,
            gql.name = "enterMaintenance",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn enter_maintenance(
        car_id: api::car::Id,
        description: api::booking::Description,
        ctx: &Context,
    ) -> Result<api::maintenance::Record, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::EnterMaintenance {
                initiator_id: my_id.into(),
                car_id: car_id.into(),
                description: description.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Car` with the provided ID back to service.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CAR_NOT_EXISTS` - the `Car` with the provided ID does not exist;
    /// - `NOT_ADMIN` - the current `User` is not an admin;
    /// - `NOT_IN_MAINTENANCE` - the `Car` is in service already.
    #[tracing::instrument(
        skip_all,
        fields(
            car_id = %car_id,
            description = %description,
            gql.name = "exitMaintenance",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn exit_maintenance(
        car_id: api::car::Id,
        description: api::booking::Description,
        ctx: &Context,
    ) -> Result<api::maintenance::Record, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::ExitMaintenance {
                initiator_id: my_id.into(),
                car_id: car_id.into(),
                description: description.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LOGIN_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`UserLogin` is occupied by another \
                             `User`"]
                LoginOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::LoginOccupied(_) => Some(Error::LoginOccupied.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = FORBIDDEN]
                #[message = "Provided credentials does not match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(Error::WrongCredentials.into())
            }
        }
    }
}

impl AsError for command::submit_rental_intent::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CITY_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`City` with the provided ID does not exist"]
                CityNotExists,

                #[code = "PERIOD_IN_PAST"]
                #[status = BAD_REQUEST]
                #[message = "Requested rental period starts in the past"]
                PeriodInPast,
            }
        }

        Some(match self {
            Self::CityNotExists(_) => Error::CityNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::PeriodInPast(_) => Error::PeriodInPast.into(),
            Self::UserNotExists(_) => return None,
        })
    }
}

impl AsError for command::confirm_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CAR_ALREADY_BOOKED"]
                #[status = CONFLICT]
                #[message = "`Car` has an active `Booking` intersecting the \
                             requested period"]
                CarAlreadyBooked,

                #[code = "CAR_NOT_AVAILABLE"]
                #[status = CONFLICT]
                #[message = "`Car` is out of service"]
                CarNotAvailable,

                #[code = "CAR_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Car` with the provided ID does not exist"]
                CarNotExists,

                #[code = "FINE_PENDING"]
                #[status = FORBIDDEN]
                #[message = "Current `User` carries an unpaid fine"]
                FinePending,

                #[code = "PAYMENT_NOT_CAPTURED"]
                #[status = PAYMENT_REQUIRED]
                #[message = "Payment was not captured"]
                PaymentNotCaptured,

                #[code = "PERIOD_IN_PAST"]
                #[status = BAD_REQUEST]
                #[message = "Requested rental period starts in the past"]
                PeriodInPast,

                #[code = "USER_ALREADY_BOOKED"]
                #[status = CONFLICT]
                #[message = "Current `User` has an active `Booking` \
                             intersecting the requested period"]
                UserAlreadyBooked,

                #[code = "USER_NOT_VERIFIED"]
                #[status = FORBIDDEN]
                #[message = "Identity of the current `User` is not verified"]
                UserNotVerified,
            }
        }

        Some(match self {
            Self::CarAlreadyBooked(_) => Error::CarAlreadyBooked.into(),
            Self::CarNotAvailable(_) => Error::CarNotAvailable.into(),
            Self::CarNotExists(_) => Error::CarNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::FinePending(_) => Error::FinePending.into(),
            Self::PaymentNotCaptured => Error::PaymentNotCaptured.into(),
            Self::PeriodInPast(_) => Error::PeriodInPast.into(),
            Self::UserAlreadyBooked(_) => Error::UserAlreadyBooked.into(),
            Self::UserNotExists(_) => return None,
            Self::UserNotVerified(_) => Error::UserNotVerified.into(),
        })
    }
}

impl AsError for command::cancel_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "BOOKING_NOT_ACTIVE"]
                #[status = CONFLICT]
                #[message = "`Booking` is cancelled or returned already"]
                BookingNotActive,

                #[code = "BOOKING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Booking` with the provided ID does not exist"]
                BookingNotExists,

                #[code = "NOT_PERMITTED"]
                #[status = FORBIDDEN]
                #[message = "Current `User` is neither the renter nor an \
                             admin"]
                NotPermitted,

                #[code = "RENTAL_ALREADY_STARTED"]
                #[status = CONFLICT]
                #[message = "Rental period has already started"]
                RentalAlreadyStarted,
            }
        }

        Some(match self {
            Self::BookingNotActive(_) => Error::BookingNotActive.into(),
            Self::BookingNotExists(_) => Error::BookingNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotPermitted(_) => Error::NotPermitted.into(),
            Self::RentalAlreadyStarted(_) => {
                Error::RentalAlreadyStarted.into()
            }
            Self::UserNotExists(_) => return None,
        })
    }
}

impl AsError for command::mark_car_taken::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "BOOKING_NOT_ACTIVE"]
                #[status = CONFLICT]
                #[message = "`Booking` is cancelled, returned, or its `Car` \
                             is taken already"]
                BookingNotActive,

                #[code = "BOOKING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Booking` with the provided ID does not exist"]
                BookingNotExists,

                #[code = "PICKUP_TOO_EARLY"]
                #[status = CONFLICT]
                #[message = "Rental period has not started yet"]
                PickupTooEarly,
            }
        }

        Some(match self {
            Self::BookingNotActive(_) => Error::BookingNotActive.into(),
            Self::BookingNotExists(_) => Error::BookingNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::Admin.into(),
            Self::PickupTooEarly(_) => Error::PickupTooEarly.into(),
            Self::UserNotExists(_) => return None,
        })
    }
}

impl AsError for command::review_car_return::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ALREADY_RETURNED"]
                #[status = CONFLICT]
                #[message = "`Booking` is reviewed already"]
                AlreadyReturned,

                #[code = "BOOKING_NOT_ACTIVE"]
                #[status = CONFLICT]
                #[message = "`Booking` is cancelled"]
                BookingNotActive,

                #[code = "BOOKING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Booking` with the provided ID does not exist"]
                BookingNotExists,

                #[code = "CAR_NOT_TAKEN"]
                #[status = CONFLICT]
                #[message = "`Car` of the `Booking` was never picked up"]
                CarNotTaken,

                #[code = "NEGATIVE_FINE"]
                #[status = BAD_REQUEST]
                #[message = "Assessed fine cannot be negative"]
                NegativeFine,
            }
        }

        Some(match self {
            Self::AlreadyReturned(_) => Error::AlreadyReturned.into(),
            Self::BookingNotActive(_) => Error::BookingNotActive.into(),
            Self::BookingNotExists(_) => Error::BookingNotExists.into(),
            Self::CarNotTaken(_) => Error::CarNotTaken.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NegativeFine(_) => Error::NegativeFine.into(),
            Self::NotPermitted(_) => api::PrivilegeError::Admin.into(),
            Self::UserNotExists(_) => return None,
        })
    }
}

impl AsError for command::settle_fine::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "BOOKING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Booking` with the provided ID does not exist"]
                BookingNotExists,

                #[code = "NO_UNSETTLED_FINE"]
                #[status = CONFLICT]
                #[message = "`Booking` carries no unpaid fine"]
                NoUnsettledFine,

                #[code = "NOT_PERMITTED"]
                #[status = FORBIDDEN]
                #[message = "Current `User` is neither the renter nor an \
                             admin"]
                NotPermitted,

                #[code = "PAYMENT_NOT_CAPTURED"]
                #[status = PAYMENT_REQUIRED]
                #[message = "Payment was not captured"]
                PaymentNotCaptured,

                #[code = "WRONG_AMOUNT"]
                #[status = CONFLICT]
                #[message = "Captured amount differs from the assessed one"]
                WrongAmount,
            }
        }

        Some(match self {
            Self::BookingNotExists(_) => Error::BookingNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NoUnsettledFine(_) => Error::NoUnsettledFine.into(),
            Self::NotPermitted(_) => Error::NotPermitted.into(),
            Self::PaymentNotCaptured => Error::PaymentNotCaptured.into(),
            Self::UserNotExists(_) => return None,
            Self::WrongAmount { .. } => Error::WrongAmount.into(),
        })
    }
}

impl AsError for command::create_car::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PLATE_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`CarPlate` is occupied by another `Car`"]
                PlateOccupied,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::Admin.into(),
            Self::PlateOccupied(_) => Error::PlateOccupied.into(),
            Self::UserNotExists(_) => return None,
        })
    }
}

impl AsError for command::update_car::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CAR_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Car` with the provided ID does not exist"]
                CarNotExists,

                #[code = "PLATE_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`CarPlate` is occupied by another `Car`"]
                PlateOccupied,
            }
        }

        Some(match self {
            Self::CarNotExists(_) => Error::CarNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::Admin.into(),
            Self::PlateOccupied(_) => Error::PlateOccupied.into(),
            Self::UserNotExists(_) => return None,
        })
    }
}

impl AsError for command::delete_car::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CAR_HAS_BOOKINGS"]
                #[status = CONFLICT]
                #[message = "`Car` has an active `Booking` starting today or \
                             later"]
                CarHasBookings,

                #[code = "CAR_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Car` with the provided ID does not exist"]
                CarNotExists,
            }
        }

        Some(match self {
            Self::CarHasBookings(_) => Error::CarHasBookings.into(),
            Self::CarNotExists(_) => Error::CarNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::Admin.into(),
            Self::UserNotExists(_) => return None,
        })
    }
}

impl AsError for command::create_catalog_entry::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NAME_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`CatalogName` is occupied by another entity of \
                             the same kind"]
                NameOccupied,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NameOccupied(_) => Error::NameOccupied.into(),
            Self::NotPermitted(_) => api::PrivilegeError::SuperAdmin.into(),
            Self::UserNotExists(_) => return None,
        })
    }
}

impl AsError for command::rename_catalog_entry::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ENTRY_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "Referred catalog entity does not exist"]
                EntryNotExists,

                #[code = "NAME_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`CatalogName` is occupied by another entity of \
                             the same kind"]
                NameOccupied,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::EntryNotExists(_) => Error::EntryNotExists.into(),
            Self::NameOccupied(_) => Error::NameOccupied.into(),
            Self::NotPermitted(_) => api::PrivilegeError::SuperAdmin.into(),
            Self::UserNotExists(_) => return None,
        })
    }
}

impl AsError for command::delete_catalog_entry::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ENTRY_IN_USE"]
                #[status = CONFLICT]
                #[message = "Referred catalog entity is still referenced"]
                EntryInUse,

                #[code = "ENTRY_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "Referred catalog entity does not exist"]
                EntryNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::EntryInUse(_) => Error::EntryInUse.into(),
            Self::EntryNotExists(_) => Error::EntryNotExists.into(),
            Self::NotPermitted(_) => api::PrivilegeError::SuperAdmin.into(),
            Self::UserNotExists(_) => return None,
        })
    }
}

impl AsError for command::enter_maintenance::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ALREADY_IN_MAINTENANCE"]
                #[status = CONFLICT]
                #[message = "`Car` is out of service already"]
                AlreadyInMaintenance,

                #[code = "CAR_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Car` with the provided ID does not exist"]
                CarNotExists,
            }
        }

        Some(match self {
            Self::AlreadyInMaintenance(_) => {
                Error::AlreadyInMaintenance.into()
            }
            Self::CarNotExists(_) => Error::CarNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotPermitted(_) => api::PrivilegeError::Admin.into(),
            Self::UserNotExists(_) => return None,
        })
    }
}

impl AsError for command::exit_maintenance::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CAR_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Car` with the provided ID does not exist"]
                CarNotExists,

                #[code = "NOT_IN_MAINTENANCE"]
                #[status = CONFLICT]
                #[message = "`Car` is in service already"]
                NotInMaintenance,
            }
        }

        Some(match self {
            Self::CarNotExists(_) => Error::CarNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotInMaintenance(_) => Error::NotInMaintenance.into(),
            Self::NotPermitted(_) => api::PrivilegeError::Admin.into(),
            Self::UserNotExists(_) => return None,
        })
    }
}
