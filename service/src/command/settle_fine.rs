//! [`Command`] for settling a [`booking::Fine`].

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, user, Booking, PaymentConfirmation, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for settling the [`booking::Fine`] of a [`Booking`].
///
/// Once the payment collaborator reports the fine payment as captured, the
/// liability is marked paid and stops gating the renter out of new
/// reservations.
#[derive(Clone, Copy, Debug)]
pub struct SettleFine {
    /// ID of the [`User`] performing this [`Command`].
    pub initiator_id: user::Id,

    /// ID of the fined [`Booking`].
    pub booking_id: booking::Id,

    /// Signal of the payment collaborator about the fine payment.
    pub payment: PaymentConfirmation,
}

impl<Db> Command<SettleFine> for Service<Db>
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

    async fn execute(&self, cmd: SettleFine) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SettleFine {
            initiator_id,
            booking_id,
            payment,
        } = cmd;

        if !payment.is_captured {
            return Err(tracerr::new!(E::PaymentNotCaptured));
        }

        let initiator = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;

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
        if booking.user_id != initiator.id && !initiator.role.is_admin() {
            return Err(tracerr::new!(E::NotPermitted(initiator_id)));
        }

        let fine = booking
            .unsettled_fine()
            .copied()
            .ok_or(E::NoUnsettledFine(booking_id))
            .map_err(tracerr::wrap!())?;
        if payment.amount != fine.amount {
            return Err(tracerr::new!(E::WrongAmount {
                captured: payment.amount,
                assessed: fine.amount,
            }));
        }

        // The unsettled fine existence guarantees the review presence.
        if let Some(review) = &mut booking.review {
            review.fine = Some(booking::Fine { paid: true, ..fine });
        }

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

/// Error of [`SettleFine`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Booking`] carries no unpaid [`booking::Fine`].
    #[display("`Booking(id: {_0})` has no unsettled fine")]
    NoUnsettledFine(#[error(not(source))] booking::Id),

    /// [`User`] is neither the renter nor an admin.
    #[display("`User(id: {_0})` is not permitted to settle this fine")]
    NotPermitted(#[error(not(source))] user::Id),

    /// Payment collaborator did not report the payment as captured.
    #[display("Payment is not captured")]
    PaymentNotCaptured,

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),

    /// Captured amount differs from the assessed one.
    #[display("captured `{captured}` doesn't match assessed `{assessed}`")]
    WrongAmount {
        /// Amount the payment collaborator reports as captured.
        captured: Money,

        /// Amount the fine was assessed at.
        assessed: Money,
    },
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::ConfirmBooking,
        domain::{Booking, Car, User},
        fixture,
        infra::{database::in_memory::InMemory, Database as _},
        Command as _, Service,
    };

    use super::{ExecutionError as E, SettleFine};

    /// Seeds a finished rental carrying an unpaid 25USD fine.
    async fn fined_rental() -> (Service<InMemory>, User, Car, Booking) {
        let (svc, renter, car) = fixture::rental_setup().await;
        let fined = fixture::returned_booking(
            &car,
            renter.id,
            fixture::period_in(-10, -8),
            Some(fixture::money("25USD")),
        );
        svc.database().execute(Insert(fined.clone())).await.unwrap();
        (svc, renter, car, fined)
    }

    #[tokio::test]
    async fn settles_exact_amount() {
        let (svc, renter, _, fined) = fined_rental().await;

        let settled = svc
            .execute(SettleFine {
                initiator_id: renter.id,
                booking_id: fined.id,
                payment: fixture::captured("25USD"),
            })
            .await
            .unwrap();

        assert!(settled.unsettled_fine().is_none());
        assert!(settled.review.unwrap().fine.unwrap().paid);
    }

    #[tokio::test]
    async fn settling_unblocks_new_bookings() {
        let (svc, renter, car, fined) = fined_rental().await;

        drop(
            svc.execute(SettleFine {
                initiator_id: renter.id,
                booking_id: fined.id,
                payment: fixture::captured("25USD"),
            })
            .await
            .unwrap(),
        );

        svc.execute(ConfirmBooking {
            initiator_id: renter.id,
            car_id: car.id,
            period: fixture::period_in(1, 3),
            payment: fixture::captured("150USD"),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn rejects_wrong_amount() {
        let (svc, renter, _, fined) = fined_rental().await;

        let res = svc
            .execute(SettleFine {
                initiator_id: renter.id,
                booking_id: fined.id,
                payment: fixture::captured("20USD"),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::WrongAmount { .. }));
    }

    #[tokio::test]
    async fn rejects_when_no_fine() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let clean = fixture::returned_booking(
            &car,
            renter.id,
            fixture::period_in(-10, -8),
            None,
        );
        svc.database().execute(Insert(clean.clone())).await.unwrap();

        let res = svc
            .execute(SettleFine {
                initiator_id: renter.id,
                booking_id: clean.id,
                payment: fixture::captured("25USD"),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::NoUnsettledFine(_)));
    }

    #[tokio::test]
    async fn rejects_stranger() {
        let (svc, _, _, fined) = fined_rental().await;
        let stranger = fixture::customer(None);
        svc.database()
            .execute(Insert(stranger.clone()))
            .await
            .unwrap();

        let res = svc
            .execute(SettleFine {
                initiator_id: stranger.id,
                booking_id: fined.id,
                payment: fixture::captured("25USD"),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::NotPermitted(_)));
    }

    #[tokio::test]
    async fn admin_may_settle_on_behalf() {
        let (svc, _, car, fined) = fined_rental().await;
        let desk = fixture::admin(car.city_id);
        svc.database().execute(Insert(desk.clone())).await.unwrap();

        let settled = svc
            .execute(SettleFine {
                initiator_id: desk.id,
                booking_id: fined.id,
                payment: fixture::captured("25USD"),
            })
            .await
            .unwrap();
        assert!(settled.unsettled_fine().is_none());
    }
}
