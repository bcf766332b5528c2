//! [`Command`] for removing a [`Car`] from the fleet.

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{car, user, Car, User},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for removing a [`Car`] from the fleet.
///
/// A [`Car`] with an active [`Booking`] starting today or later cannot be
/// removed; purely historical [`Booking`]s keep their rows and merely lose
/// the car reference.
///
/// [`Booking`]: crate::domain::Booking
#[derive(Clone, Copy, Debug)]
pub struct DeleteCar {
    /// ID of the [`User`] performing this [`Command`].
    pub initiator_id: user::Id,

    /// ID of the [`Car`] to remove.
    pub car_id: car::Id,
}

impl<Db> Command<DeleteCar> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Car>, car::Id>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::booking::HasUpcoming, car::Id>>,
            Ok = read::booking::HasUpcoming,
            Err = Traced<database::Error>,
        > + Database<Delete<By<Car, car::Id>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteCar) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteCar {
            initiator_id,
            car_id,
        } = cmd;

        let initiator = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;
        if !initiator.role.is_admin() {
            return Err(tracerr::new!(E::NotPermitted(initiator_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        drop(
            tx.execute(Select(By::<Option<Car>, _>::new(car_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::CarNotExists(car_id))
                .map_err(tracerr::wrap!())?,
        );

        let upcoming = tx
            .execute(Select(By::<read::booking::HasUpcoming, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if upcoming == true {
            return Err(tracerr::new!(E::CarHasBookings(car_id)));
        }

        tx.execute(Delete(By::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)
    }
}

/// Error of [`DeleteCar`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Car`] still has an active booking starting today or later.
    #[display("`Car(id: {_0})` still has upcoming bookings")]
    CarHasBookings(#[error(not(source))] car::Id),

    /// [`Car`] with the provided ID does not exist.
    #[display("`Car(id: {_0})` does not exist")]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`User`] is not permitted to manage the fleet.
    #[display("`User(id: {_0})` is not permitted to manage the fleet")]
    NotPermitted(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use crate::{
        command::ConfirmBooking,
        domain::{Booking, Car},
        fixture,
        infra::Database as _,
        Command as _,
    };

    use super::{DeleteCar, ExecutionError as E};

    #[tokio::test]
    async fn rejects_car_with_upcoming_bookings() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let boss = fixture::admin(car.city_id);
        svc.database().execute(Insert(boss.clone())).await.unwrap();
        drop(
            svc.execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(1, 3),
                payment: fixture::captured("150USD"),
            })
            .await
            .unwrap(),
        );

        let res = svc
            .execute(DeleteCar {
                initiator_id: boss.id,
                car_id: car.id,
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::CarHasBookings(_)));
    }

    #[tokio::test]
    async fn historical_bookings_lose_car_reference() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let boss = fixture::admin(car.city_id);
        svc.database().execute(Insert(boss.clone())).await.unwrap();
        let old = fixture::returned_booking(
            &car,
            renter.id,
            fixture::period_in(-10, -8),
            None,
        );
        svc.database().execute(Insert(old.clone())).await.unwrap();

        svc.execute(DeleteCar {
            initiator_id: boss.id,
            car_id: car.id,
        })
        .await
        .unwrap();

        let gone = svc
            .database()
            .execute(Select(By::<Option<Car>, _>::new(car.id)))
            .await
            .unwrap();
        assert!(gone.is_none());
        let kept = svc
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(old.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(kept.car_id.is_none());
    }
}
