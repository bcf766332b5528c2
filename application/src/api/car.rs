//! [`Car`]-related definitions.

use common::{DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, catalog, scalar},
    AsError, Context, Error,
};

/// A `Car` of the fleet.
#[derive(Clone, Debug, From)]
pub struct Car {
    /// ID of this [`Car`].
    pub id: Id,

    /// [`domain::Car`] representing this [`Car`].
    car: OnceCell<domain::Car>,
}

impl From<domain::Car> for Car {
    fn from(car: domain::Car) -> Self {
        Self {
            id: car.id.into(),
            car: OnceCell::new_with(Some(car)),
        }
    }
}

impl Car {
    /// Creates a new [`Car`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Car`] with the provided ID exists,
    /// otherwise accessing this [`Car`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            car: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Car`] representing this [`Car`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Car`] doesn't exist.
    async fn car(&self, ctx: &Context) -> Result<&domain::Car, Error> {
        let id = self.id.into();
        self.car
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::car::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|c| {
                        future::ready(c.ok_or_else(|| {
                            api::query::CarError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A `Car` of the fleet.
#[graphql_object(context = Context)]
impl Car {
    /// Unique identifier of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Canonicalized registration plate of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.plate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn plate(&self, ctx: &Context) -> Result<Plate, Error> {
        Ok(self.car(ctx).await?.plate.clone().into())
    }

    /// Color of this `Car`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.color",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn color(&self, ctx: &Context) -> Result<Color, Error> {
        Ok(self.car(ctx).await?.color.clone().into())
    }

    /// Mileage of this `Car`, in kilometers.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.mileage",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn mileage(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(i32::try_from(self.car(ctx).await?.mileage)
            .unwrap_or(i32::MAX))
    }

    /// Price of renting this `Car` for one day.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.pricePerDay",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn price_per_day(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.car(ctx).await?.price_per_day)
    }

    /// Minimum rent to be paid for this `Car` regardless of the rental
    /// length.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.minRent",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn min_rent(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.car(ctx).await?.min_rent)
    }

    /// Deposit to be paid at the beginning of the rent.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.deposit",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn deposit(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.car(ctx).await?.deposit)
    }

    /// ID of the `CarCompany` manufacturing this `Car`, if known.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.companyId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn company_id(
        &self,
        ctx: &Context,
    ) -> Result<Option<catalog::CarCompanyId>, Error> {
        Ok(self.car(ctx).await?.company_id.map(Into::into))
    }

    /// ID of the `CarCategory` of this `Car`, if known.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.categoryId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn category_id(
        &self,
        ctx: &Context,
    ) -> Result<Option<catalog::CarCategoryId>, Error> {
        Ok(self.car(ctx).await?.category_id.map(Into::into))
    }

    /// ID of the `CarModel` of this `Car`, if known.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.modelId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn model_id(
        &self,
        ctx: &Context,
    ) -> Result<Option<catalog::CarModelId>, Error> {
        Ok(self.car(ctx).await?.model_id.map(Into::into))
    }

    /// ID of the `City` this `Car` is currently located in, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.cityId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn city_id(
        &self,
        ctx: &Context,
    ) -> Result<Option<catalog::CityId>, Error> {
        Ok(self.car(ctx).await?.city_id.map(Into::into))
    }

    /// Indicator whether this `Car` is in service.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.isAvailable",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_available(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.car(ctx).await?.is_available)
    }

    /// `DateTime` when this `Car` was added to the fleet.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Car.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.car(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Car`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::car::Id)]
#[into(domain::car::Id)]
#[graphql(name = "CarId", transparent)]
pub struct Id(Uuid);

/// Canonicalized registration plate of a `Car`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "CarPlate",
    with = scalar::Via::<domain::car::Plate>,
)]
pub struct Plate(domain::car::Plate);

/// Color of a `Car`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "CarColor",
    with = scalar::Via::<domain::car::Color>,
)]
pub struct Color(domain::car::Color);

pub mod list {
    //! Definitions related to the available [`Car`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::{query, read, Query as _};

    use crate::{api::scalar, AsError, Context, Error};

    use super::{Car, Id};

    /// Cursor for the available `Car` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(Id, read::car::list::Cursor)]
    #[graphql(
        name = "CarListCursor",
        with = scalar::Via::<read::car::list::Cursor>,
    )]
    pub struct Cursor(pub read::car::list::Cursor);

    /// Edge in the [`Car`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(read::car::list::Edge);

    /// Edge in the available `Car` list.
    #[graphql_object(name = "CarListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `CarListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `CarListEdge`.
        #[must_use]
        pub fn node(&self) -> Car {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from repository guarantees `Car` \
                          existence"
            )]
            unsafe {
                Car::new_unchecked(self.0.node)
            }
        }
    }

    /// Connection of the [`Car`] list.
    #[derive(Clone, Debug)]
    pub struct Connection {
        /// Underlying [`read::car::list::Connection`].
        conn: read::car::list::Connection,

        /// [`read::car::list::Filter`] the page was selected with.
        filter: read::car::list::Filter,
    }

    impl Connection {
        /// Creates a new [`Connection`] out of the selected page.
        #[must_use]
        pub(crate) fn new(
            conn: read::car::list::Connection,
            filter: read::car::list::Filter,
        ) -> Self {
            Self { conn, filter }
        }
    }

    /// Connection of the available `Car` list.
    #[graphql_object(name = "CarListConnection", context = Context)]
    impl Connection {
        /// Edges in this `CarListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.conn.edges.iter().copied().map(Into::into).collect()
        }

        /// Information about the page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo {
                info: self.conn.page_info(),
                start_cursor: self.conn.edges.first().map(|e| e.cursor.into()),
                end_cursor: self.conn.edges.last().map(|e| e.cursor.into()),
                filter: self.filter,
            }
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Copy, Debug)]
    pub struct PageInfo {
        /// Underlying [`read::car::list::PageInfo`].
        info: read::car::list::PageInfo,

        /// Start cursor of the page.
        start_cursor: Option<Cursor>,

        /// End cursor of the page.
        end_cursor: Option<Cursor>,

        /// [`read::car::list::Filter`] the page was selected with.
        filter: read::car::list::Filter,
    }

    /// Information about a `CarListConnection` page.
    #[graphql_object(name = "CarListPageInfo", context = Context)]
    impl PageInfo {
        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.info.has_next_page
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.info.has_previous_page
        }

        /// Start cursor of the page.
        #[must_use]
        pub fn start_cursor(&self) -> &Option<Cursor> {
            &self.start_cursor
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> &Option<Cursor> {
            &self.end_cursor
        }

        /// Total count of `Car`s available for the requested city and
        /// period.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            ctx.service()
                .execute(query::cars::TotalCount::by(self.filter))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(Into::into)
        }
    }
}
