//! [`Command`] for recording a [`Car`] pickup.

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    Date, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, user, Booking, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording that the [`Car`] of a [`Booking`] was handed
/// over to the renter.
///
/// Idempotent: re-marking an already taken [`Booking`] changes nothing and
/// succeeds, so a double-submitted pickup form does not fail the desk admin.
///
/// [`Car`]: crate::domain::Car
#[derive(Clone, Copy, Debug)]
pub struct MarkCarTaken {
    /// ID of the [`User`] performing this [`Command`].
    pub initiator_id: user::Id,

    /// ID of the [`Booking`] whose [`Car`] is picked up.
    ///
    /// [`Car`]: crate::domain::Car
    pub booking_id: booking::Id,
}

impl<Db> Command<MarkCarTaken> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: MarkCarTaken) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkCarTaken {
            initiator_id,
            booking_id,
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

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;
        if !booking.is_active() {
            return Err(tracerr::new!(E::BookingNotActive(booking_id)));
        }
        if booking.taken_at.is_some() {
            return Ok(booking);
        }
        if Date::today() < booking.period.from() {
            return Err(tracerr::new!(E::PickupTooEarly(booking_id)));
        }

        booking.taken_at = Some(DateTime::now().coerce());

        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(booking)
    }
}

/// Error of [`MarkCarTaken`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Booking`] is cancelled.
    #[display("`Booking(id: {_0})` is not active")]
    BookingNotActive(#[error(not(source))] booking::Id),

    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`User`] is not permitted to record pickups.
    #[display("`User(id: {_0})` is not permitted to record pickups")]
    NotPermitted(#[error(not(source))] user::Id),

    /// Rental [`Period`] of the [`Booking`] has not started yet.
    ///
    /// [`Period`]: booking::Period
    #[display("`Booking(id: {_0})` has not started yet")]
    PickupTooEarly(#[error(not(source))] booking::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::ConfirmBooking,
        fixture,
        infra::Database as _,
        Command as _,
    };

    use super::{ExecutionError as E, MarkCarTaken};

    #[tokio::test]
    async fn records_pickup() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let desk = fixture::admin(car.city_id);
        svc.database().execute(Insert(desk.clone())).await.unwrap();
        let booking = svc
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(0, 2),
                payment: fixture::captured("150USD"),
            })
            .await
            .unwrap();

        let taken = svc
            .execute(MarkCarTaken {
                initiator_id: desk.id,
                booking_id: booking.id,
            })
            .await
            .unwrap();

        assert!(taken.taken_at.is_some());
    }

    #[tokio::test]
    async fn is_idempotent() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let desk = fixture::admin(car.city_id);
        svc.database().execute(Insert(desk.clone())).await.unwrap();
        let booking = svc
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(0, 2),
                payment: fixture::captured("150USD"),
            })
            .await
            .unwrap();

        let first = svc
            .execute(MarkCarTaken {
                initiator_id: desk.id,
                booking_id: booking.id,
            })
            .await
            .unwrap();
        let second = svc
            .execute(MarkCarTaken {
                initiator_id: desk.id,
                booking_id: booking.id,
            })
            .await
            .unwrap();

        assert_eq!(first.taken_at, second.taken_at);
    }

    #[tokio::test]
    async fn rejects_early_pickup() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let desk = fixture::admin(car.city_id);
        svc.database().execute(Insert(desk.clone())).await.unwrap();
        let booking = svc
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(1, 3),
                payment: fixture::captured("150USD"),
            })
            .await
            .unwrap();

        let res = svc
            .execute(MarkCarTaken {
                initiator_id: desk.id,
                booking_id: booking.id,
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::PickupTooEarly(_)));
    }

    #[tokio::test]
    async fn rejects_non_admin() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let booking = svc
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(0, 2),
                payment: fixture::captured("150USD"),
            })
            .await
            .unwrap();

        let res = svc
            .execute(MarkCarTaken {
                initiator_id: renter.id,
                booking_id: booking.id,
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::NotPermitted(_)));
    }
}
