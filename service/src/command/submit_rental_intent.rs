//! [`Command`] for (re)submitting a [`RentalIntent`].

use common::{
    operations::{By, Select, Upsert},
    Date, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking::Period, city, user, City, RentalIntent, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for (re)submitting a [`RentalIntent`].
///
/// At most one [`RentalIntent`] lives per [`User`]: resubmitting simply
/// overwrites the previous one, so browsing for new dates never requires
/// cleaning up the old search first.
#[derive(Clone, Copy, Debug)]
pub struct SubmitRentalIntent {
    /// ID of the [`User`] performing this [`Command`].
    pub initiator_id: user::Id,

    /// Requested rental [`Period`].
    pub period: Period,

    /// ID of the [`City`] to pick a [`Car`] up in.
    ///
    /// [`Car`]: crate::domain::Car
    pub city_id: city::Id,
}

impl<Db> Command<SubmitRentalIntent> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<City>, city::Id>>,
            Ok = Option<City>,
            Err = Traced<database::Error>,
        > + Database<Upsert<RentalIntent>, Err = Traced<database::Error>>,
{
    type Ok = RentalIntent;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitRentalIntent,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitRentalIntent {
            initiator_id,
            period,
            city_id,
        } = cmd;

        if period.from() < Date::today() {
            return Err(tracerr::new!(E::PeriodInPast(period)));
        }

        self.database()
            .execute(Select(By::<Option<User>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(initiator_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        self.database()
            .execute(Select(By::<Option<City>, _>::new(city_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CityNotExists(city_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let intent = RentalIntent {
            user_id: initiator_id,
            period,
            city_id,
            created_at: DateTime::now().coerce(),
        };

        self.database()
            .execute(Upsert(intent.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(intent)
    }
}

/// Error of [`SubmitRentalIntent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`City`] with the provided ID does not exist.
    #[display("`City(id: {_0})` does not exist")]
    CityNotExists(#[error(not(source))] city::Id),

    /// Requested [`Period`] starts in the past.
    #[display("`{_0}` period starts in the past")]
    PeriodInPast(#[error(not(source))] Period),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::RentalIntent, fixture, infra::Database as _, Command as _,
    };

    use super::{ExecutionError as E, SubmitRentalIntent};

    #[tokio::test]
    async fn resubmission_overwrites() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let city_id = car.city_id.unwrap();

        drop(
            svc.execute(SubmitRentalIntent {
                initiator_id: renter.id,
                period: fixture::period_in(1, 3),
                city_id,
            })
            .await
            .unwrap(),
        );
        let latest = svc
            .execute(SubmitRentalIntent {
                initiator_id: renter.id,
                period: fixture::period_in(5, 7),
                city_id,
            })
            .await
            .unwrap();

        let stored = svc
            .database()
            .execute(Select(By::<Option<RentalIntent>, _>::new(renter.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.period, latest.period);
    }

    #[tokio::test]
    async fn rejects_past_period() {
        let (svc, renter, car) = fixture::rental_setup().await;

        let res = svc
            .execute(SubmitRentalIntent {
                initiator_id: renter.id,
                period: fixture::period_in(-2, 2),
                city_id: car.city_id.unwrap(),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::PeriodInPast(_)));
    }

    #[tokio::test]
    async fn rejects_unknown_city() {
        let (svc, renter, _) = fixture::rental_setup().await;

        let res = svc
            .execute(SubmitRentalIntent {
                initiator_id: renter.id,
                period: fixture::period_in(1, 3),
                city_id: crate::domain::city::Id::new(),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::CityNotExists(_)));
    }
}
