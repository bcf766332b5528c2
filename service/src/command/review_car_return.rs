//! [`Command`] for reviewing a [`Car`] return.

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, user, Booking, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for reviewing a returned [`Car`] and closing out its
/// [`Booking`].
///
/// Records the admin's condition checklist, an optional [`booking::Fine`]
/// liability, and the return moment. A positive fine stays attached to this
/// [`Booking`] and gates the renter out of new reservations until settled.
///
/// [`Car`]: crate::domain::Car
#[derive(Clone, Debug)]
pub struct ReviewCarReturn {
    /// ID of the [`User`] performing this [`Command`].
    pub initiator_id: user::Id,

    /// ID of the [`Booking`] being closed out.
    pub booking_id: booking::Id,

    /// Whether the [`Car`] came back on the agreed date.
    ///
    /// [`Car`]: crate::domain::Car
    pub on_said_date: bool,

    /// Whether the [`Car`] came back at the agreed time.
    ///
    /// [`Car`]: crate::domain::Car
    pub on_said_time: bool,

    /// Whether the [`Car`] came back in a proper condition.
    ///
    /// [`Car`]: crate::domain::Car
    pub proper_condition: bool,

    /// Free-text notes of the reviewing admin.
    pub description: booking::Description,

    /// Fine to assess against the renter, if any.
    pub fine: Option<Money>,
}

impl<Db> Command<ReviewCarReturn> for Service<Db>
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

    async fn execute(
        &self,
        cmd: ReviewCarReturn,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReviewCarReturn {
            initiator_id,
            booking_id,
            on_said_date,
            on_said_time,
            proper_condition,
            description,
            fine,
        } = cmd;

        if let Some(amount) = &fine {
            if amount.amount.is_sign_negative() {
                return Err(tracerr::new!(E::NegativeFine(*amount)));
            }
        }

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
        if booking.taken_at.is_none() {
            return Err(tracerr::new!(E::CarNotTaken(booking_id)));
        }
        if booking.returned_at.is_some() {
            return Err(tracerr::new!(E::AlreadyReturned(booking_id)));
        }

        booking.review = Some(booking::Review {
            on_said_date,
            on_said_time,
            proper_condition,
            description,
            // A zero fine is no liability at all.
            fine: fine.filter(|m| !m.amount.is_zero()).map(|amount| {
                booking::Fine {
                    amount,
                    paid: false,
                }
            }),
        });
        booking.returned_at = Some(DateTime::now().coerce());

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

/// Error of [`ReviewCarReturn`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Booking`] is already reviewed.
    #[display("`Booking(id: {_0})` is already returned")]
    AlreadyReturned(#[error(not(source))] booking::Id),

    /// [`Booking`] is cancelled.
    #[display("`Booking(id: {_0})` is not active")]
    BookingNotActive(#[error(not(source))] booking::Id),

    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Car`] of the [`Booking`] was never picked up.
    ///
    /// [`Car`]: crate::domain::Car
    #[display("`Booking(id: {_0})` has no recorded pickup")]
    CarNotTaken(#[error(not(source))] booking::Id),

    /// Assessed fine is negative.
    #[display("`{_0}` is not a valid fine amount")]
    NegativeFine(#[error(not(source))] Money),

    /// [`User`] is not permitted to review returns.
    #[display("`User(id: {_0})` is not permitted to review returns")]
    NotPermitted(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        command::{ConfirmBooking, MarkCarTaken},
        domain::{booking::Description, Booking, Car, User},
        fixture,
        infra::{database::in_memory::InMemory, Database as _},
        Command as _, Service,
    };

    use super::{ExecutionError as E, ReviewCarReturn};

    /// Seeds a picked-up rental ready to be reviewed on return.
    async fn taken_rental() -> (Service<InMemory>, User, User, Car, Booking) {
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
        let booking = svc
            .execute(MarkCarTaken {
                initiator_id: desk.id,
                booking_id: booking.id,
            })
            .await
            .unwrap();
        (svc, renter, desk, car, booking)
    }

    #[tokio::test]
    async fn records_review_with_fine() {
        let (svc, _, desk, _, booking) = taken_rental().await;

        let reviewed = svc
            .execute(ReviewCarReturn {
                initiator_id: desk.id,
                booking_id: booking.id,
                on_said_date: true,
                on_said_time: false,
                proper_condition: false,
                description: Description::new("scratched bumper").unwrap(),
                fine: Some(fixture::money("25USD")),
            })
            .await
            .unwrap();

        assert!(reviewed.returned_at.is_some());
        let fine = reviewed.unsettled_fine().unwrap();
        assert_eq!(fine.amount, fixture::money("25USD"));
        assert!(!fine.paid);
    }

    #[tokio::test]
    async fn drops_zero_fine() {
        let (svc, _, desk, _, booking) = taken_rental().await;

        let reviewed = svc
            .execute(ReviewCarReturn {
                initiator_id: desk.id,
                booking_id: booking.id,
                on_said_date: true,
                on_said_time: true,
                proper_condition: true,
                description: Description::new("all good").unwrap(),
                fine: Some(fixture::money("0USD")),
            })
            .await
            .unwrap();

        assert!(reviewed.review.unwrap().fine.is_none());
    }

    #[tokio::test]
    async fn rejects_negative_fine() {
        let (svc, _, desk, _, booking) = taken_rental().await;

        let res = svc
            .execute(ReviewCarReturn {
                initiator_id: desk.id,
                booking_id: booking.id,
                on_said_date: true,
                on_said_time: true,
                proper_condition: true,
                description: Description::new("all good").unwrap(),
                fine: Some(fixture::money("-5USD")),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::NegativeFine(_)));
    }

    #[tokio::test]
    async fn rejects_untaken_car() {
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

        let res = svc
            .execute(ReviewCarReturn {
                initiator_id: desk.id,
                booking_id: booking.id,
                on_said_date: true,
                on_said_time: true,
                proper_condition: true,
                description: Description::new("all good").unwrap(),
                fine: None,
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::CarNotTaken(_)));
    }

    #[tokio::test]
    async fn rejects_double_review() {
        let (svc, _, desk, _, booking) = taken_rental().await;
        drop(
            svc.execute(ReviewCarReturn {
                initiator_id: desk.id,
                booking_id: booking.id,
                on_said_date: true,
                on_said_time: true,
                proper_condition: true,
                description: Description::new("all good").unwrap(),
                fine: None,
            })
            .await
            .unwrap(),
        );

        let res = svc
            .execute(ReviewCarReturn {
                initiator_id: desk.id,
                booking_id: booking.id,
                on_said_date: true,
                on_said_time: true,
                proper_condition: true,
                description: Description::new("again").unwrap(),
                fine: None,
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::AlreadyReturned(_)));
    }

    #[tokio::test]
    async fn rejects_non_admin() {
        let (svc, renter, _, _, booking) = taken_rental().await;

        let res = svc
            .execute(ReviewCarReturn {
                initiator_id: renter.id,
                booking_id: booking.id,
                on_said_date: true,
                on_said_time: true,
                proper_condition: true,
                description: Description::new("all good").unwrap(),
                fine: None,
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::NotPermitted(_)));
    }
}
