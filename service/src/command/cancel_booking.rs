//! [`Command`] for cancelling a [`Booking`].

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, user, Booking, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Booking`].
///
/// Only the renter themselves may cancel, and only strictly before the
/// rental [`Period`] starts. A cancelled [`Booking`] keeps its row but stops
/// holding its dates against availability.
///
/// [`Period`]: booking::Period
#[derive(Clone, Copy, Debug)]
pub struct CancelBooking {
    /// ID of the [`User`] performing this [`Command`].
    pub initiator_id: user::Id,

    /// ID of the [`Booking`] to cancel.
    pub booking_id: booking::Id,
}

impl<Db> Command<CancelBooking> for Service<Db>
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

    async fn execute(&self, cmd: CancelBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelBooking {
            initiator_id,
            booking_id,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<User>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(initiator_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

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
        if booking.user_id != initiator_id {
            return Err(tracerr::new!(E::NotPermitted(initiator_id)));
        }
        if !booking.is_active() {
            return Err(tracerr::new!(E::BookingNotActive(booking_id)));
        }
        if !booking.period.starts_after(Date::today()) {
            return Err(tracerr::new!(E::RentalAlreadyStarted(booking_id)));
        }

        booking.status = booking::Status::Cancelled;

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

/// Error of [`CancelBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Booking`] is already cancelled.
    #[display("`Booking(id: {_0})` is not active")]
    BookingNotActive(#[error(not(source))] booking::Id),

    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`User`] is not the renter of the [`Booking`].
    #[display("`User(id: {_0})` is not the renter of the booking")]
    NotPermitted(#[error(not(source))] user::Id),

    /// Rental [`Period`] of the [`Booking`] has already started.
    ///
    /// [`Period`]: booking::Period
    #[display("`Booking(id: {_0})` has already started")]
    RentalAlreadyStarted(#[error(not(source))] booking::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::ConfirmBooking,
        domain::booking::Status,
        fixture,
        infra::Database as _,
        Command as _,
    };

    use super::{CancelBooking, ExecutionError as E};

    #[tokio::test]
    async fn cancels_upcoming_booking() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let booking = svc
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(2, 4),
                payment: fixture::captured("150USD"),
            })
            .await
            .unwrap();

        let cancelled = svc
            .execute(CancelBooking {
                initiator_id: renter.id,
                booking_id: booking.id,
            })
            .await
            .unwrap();

        assert_eq!(cancelled.status, Status::Cancelled);
    }

    #[tokio::test]
    async fn cancelling_frees_the_period() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let other = fixture::customer(None);
        svc.database().execute(Insert(other.clone())).await.unwrap();
        let booking = svc
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(2, 4),
                payment: fixture::captured("150USD"),
            })
            .await
            .unwrap();

        drop(
            svc.execute(CancelBooking {
                initiator_id: renter.id,
                booking_id: booking.id,
            })
            .await
            .unwrap(),
        );

        svc.execute(ConfirmBooking {
            initiator_id: other.id,
            car_id: car.id,
            period: fixture::period_in(2, 4),
            payment: fixture::captured("150USD"),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn rejects_foreign_booking() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let other = fixture::customer(None);
        svc.database().execute(Insert(other.clone())).await.unwrap();
        let booking = svc
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(2, 4),
                payment: fixture::captured("150USD"),
            })
            .await
            .unwrap();

        let res = svc
            .execute(CancelBooking {
                initiator_id: other.id,
                booking_id: booking.id,
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::NotPermitted(_)));
    }

    #[tokio::test]
    async fn rejects_started_rental() {
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
            .execute(CancelBooking {
                initiator_id: renter.id,
                booking_id: booking.id,
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::RentalAlreadyStarted(_)));
    }

    #[tokio::test]
    async fn rejects_double_cancellation() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let booking = svc
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(2, 4),
                payment: fixture::captured("150USD"),
            })
            .await
            .unwrap();

        drop(
            svc.execute(CancelBooking {
                initiator_id: renter.id,
                booking_id: booking.id,
            })
            .await
            .unwrap(),
        );

        let res = svc
            .execute(CancelBooking {
                initiator_id: renter.id,
                booking_id: booking.id,
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::BookingNotActive(_)));
    }
}
