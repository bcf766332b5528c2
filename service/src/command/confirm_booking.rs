//! [`Command`] for confirming a new [`Booking`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    Date, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        booking::{self, Period},
        car, user, Booking, Car, PaymentConfirmation, RentalIntent, User,
    },
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for confirming a new [`Booking`].
///
/// This is the only place a [`Booking`] comes into existence. Every
/// availability precondition is re-checked inside a transaction holding a
/// per-[`Car`] lock, so two renters racing for the same [`Car`] and
/// overlapping dates serialize here and exactly one of them wins.
///
/// The renter's home [`City`] is recorded as the pickup one, while the
/// [`City`] of their live [`RentalIntent`] (the one searched in) becomes the
/// delivery one.
///
/// [`City`]: crate::domain::City
#[derive(Clone, Copy, Debug)]
pub struct ConfirmBooking {
    /// ID of the [`User`] performing this [`Command`].
    pub initiator_id: user::Id,

    /// ID of the [`Car`] to book.
    pub car_id: car::Id,

    /// Requested rental [`Period`].
    pub period: Period,

    /// Signal of the payment collaborator about the upfront payment.
    pub payment: PaymentConfirmation,
}

impl<Db> Command<ConfirmBooking> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Lock<By<Car, car::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Car>, car::Id>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<RentalIntent>, user::Id>>,
            Ok = Option<RentalIntent>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::user::HasUnsettledFine, user::Id>>,
            Ok = read::user::HasUnsettledFine,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::booking::HasConflict, read::booking::CarConflict>>,
            Ok = read::booking::HasConflict,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::booking::HasConflict, read::booking::UserConflict>>,
            Ok = read::booking::HasConflict,
            Err = Traced<database::Error>,
        > + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ConfirmBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ConfirmBooking {
            initiator_id,
            car_id,
            period,
            payment,
        } = cmd;

        if period.from() < Date::today() {
            return Err(tracerr::new!(E::PeriodInPast(period)));
        }
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
        if !initiator.is_verified {
            return Err(tracerr::new!(E::UserNotVerified(initiator_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent confirmations upon the same `Car`.
        tx.execute(Lock(By::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let car = tx
            .execute(Select(By::<Option<Car>, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CarNotExists(car_id))
            .map_err(tracerr::wrap!())?;
        if !car.is_available {
            return Err(tracerr::new!(E::CarNotAvailable(car_id)));
        }

        let fined = tx
            .execute(Select(By::<read::user::HasUnsettledFine, _>::new(
                initiator_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if fined == true {
            return Err(tracerr::new!(E::FinePending(initiator_id)));
        }

        let user_conflict = tx
            .execute(Select(By::<read::booking::HasConflict, _>::new(
                read::booking::UserConflict {
                    user_id: initiator_id,
                    period,
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if user_conflict == true {
            return Err(tracerr::new!(E::UserAlreadyBooked(initiator_id)));
        }

        let car_conflict = tx
            .execute(Select(By::<read::booking::HasConflict, _>::new(
                read::booking::CarConflict { car_id, period },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if car_conflict == true {
            return Err(tracerr::new!(E::CarAlreadyBooked(car_id)));
        }

        // The intent is only read here, not consumed: resubmitting dates
        // overwrites it anyway.
        let intent = tx
            .execute(Select(By::<Option<RentalIntent>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let booking = Booking {
            id: booking::Id::new(),
            car_id: Some(car.id),
            user_id: initiator.id,
            status: booking::Status::Confirmed,
            period,
            pickup_city_id: initiator.city_id,
            delivery_city_id: intent.map_or(car.city_id, |i| Some(i.city_id)),
            created_at: DateTime::now().coerce(),
            taken_at: None,
            returned_at: None,
            review: None,
        };

        tx.execute(Insert(booking.clone()))
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

/// Error of [`ConfirmBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Car`] already holds an active [`Booking`] overlapping the requested
    /// [`Period`].
    #[display("`Car(id: {_0})` is already booked for the requested period")]
    CarAlreadyBooked(#[error(not(source))] car::Id),

    /// [`Car`] is out of service.
    #[display("`Car(id: {_0})` is not available")]
    CarNotAvailable(#[error(not(source))] car::Id),

    /// [`Car`] with the provided ID does not exist.
    #[display("`Car(id: {_0})` does not exist")]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`User`] carries an unpaid fine.
    #[display("`User(id: {_0})` has an unpaid fine")]
    FinePending(#[error(not(source))] user::Id),

    /// Payment collaborator did not report the payment as captured.
    #[display("Payment is not captured")]
    PaymentNotCaptured,

    /// Requested [`Period`] starts in the past.
    #[display("`{_0}` period starts in the past")]
    PeriodInPast(#[error(not(source))] Period),

    /// [`User`] already holds an active [`Booking`] overlapping the requested
    /// [`Period`].
    #[display(
        "`User(id: {_0})` already holds a booking for the requested period"
    )]
    UserAlreadyBooked(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`User`] has not verified their account yet.
    #[display("`User(id: {_0})` is not verified")]
    UserNotVerified(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{Insert, Upsert},
        DateTime,
    };

    use crate::{
        domain::{
            booking::Status, catalog::Entry, PaymentConfirmation, RentalIntent,
        },
        fixture,
        infra::Database as _,
        Command as _,
    };

    use super::{ConfirmBooking, ExecutionError as E};

    #[tokio::test]
    async fn books_available_car() {
        let (svc, renter, car) = fixture::rental_setup().await;

        let booking = svc
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(1, 3),
                payment: fixture::captured("150USD"),
            })
            .await
            .unwrap();

        assert_eq!(booking.status, Status::Confirmed);
        assert_eq!(booking.car_id, Some(car.id));
        assert_eq!(booking.user_id, renter.id);
        assert_eq!(booking.pickup_city_id, renter.city_id);
        assert_eq!(booking.delivery_city_id, car.city_id);
        assert!(booking.taken_at.is_none());
        assert!(booking.review.is_none());
    }

    #[tokio::test]
    async fn records_home_city_as_pickup_and_searched_as_delivery() {
        let (svc, _, car) = fixture::rental_setup().await;
        let mumbai = fixture::city("MUMBAI");
        let renter = fixture::customer(Some(mumbai.id));
        let db = svc.database();
        db.execute(Insert(Entry::City(mumbai.clone()))).await.unwrap();
        db.execute(Insert(renter.clone())).await.unwrap();
        db.execute(Upsert(RentalIntent {
            user_id: renter.id,
            period: fixture::period_in(1, 3),
            city_id: car.city_id.unwrap(),
            created_at: DateTime::now().coerce(),
        }))
        .await
        .unwrap();

        let booking = svc
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(1, 3),
                payment: fixture::captured("150USD"),
            })
            .await
            .unwrap();

        assert_eq!(booking.pickup_city_id, Some(mumbai.id));
        assert_eq!(booking.delivery_city_id, car.city_id);
    }

    #[tokio::test]
    async fn rejects_overlapping_period() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let other = fixture::customer(None);
        svc.database().execute(Insert(other.clone())).await.unwrap();

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
            .execute(ConfirmBooking {
                initiator_id: other.id,
                car_id: car.id,
                period: fixture::period_in(3, 5),
                payment: fixture::captured("150USD"),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::CarAlreadyBooked(_)));
    }

    #[tokio::test]
    async fn allows_back_to_back_periods() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let other = fixture::customer(None);
        svc.database().execute(Insert(other.clone())).await.unwrap();

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

        svc.execute(ConfirmBooking {
            initiator_id: other.id,
            car_id: car.id,
            period: fixture::period_in(4, 6),
            payment: fixture::captured("150USD"),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn rejects_second_active_rental_of_same_user() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let another_car = fixture::car(car.city_id.unwrap());
        svc.database()
            .execute(Insert(another_car.clone()))
            .await
            .unwrap();

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
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: another_car.id,
                period: fixture::period_in(2, 4),
                payment: fixture::captured("150USD"),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::UserAlreadyBooked(_)));
    }

    #[tokio::test]
    async fn rejects_period_in_past() {
        let (svc, renter, car) = fixture::rental_setup().await;

        let res = svc
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(-1, 2),
                payment: fixture::captured("150USD"),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::PeriodInPast(_)));
    }

    #[tokio::test]
    async fn rejects_uncaptured_payment() {
        let (svc, renter, car) = fixture::rental_setup().await;

        let res = svc
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(1, 3),
                payment: PaymentConfirmation {
                    is_captured: false,
                    amount: fixture::money("150USD"),
                },
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::PaymentNotCaptured));
    }

    #[tokio::test]
    async fn rejects_unverified_user() {
        let (svc, _, car) = fixture::rental_setup().await;
        let mut unverified = fixture::customer(None);
        unverified.is_verified = false;
        svc.database()
            .execute(Insert(unverified.clone()))
            .await
            .unwrap();

        let res = svc
            .execute(ConfirmBooking {
                initiator_id: unverified.id,
                car_id: car.id,
                period: fixture::period_in(1, 3),
                payment: fixture::captured("150USD"),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::UserNotVerified(_)));
    }

    #[tokio::test]
    async fn rejects_car_out_of_service() {
        let (svc, renter, mut car) = fixture::rental_setup().await;
        car.is_available = false;
        svc.database().execute(Insert(car.clone())).await.unwrap();

        let res = svc
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(1, 3),
                payment: fixture::captured("150USD"),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::CarNotAvailable(_)));
    }

    #[tokio::test]
    async fn rejects_user_with_unsettled_fine() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let fined = fixture::returned_booking(
            &car,
            renter.id,
            fixture::period_in(-10, -8),
            Some(fixture::money("25USD")),
        );
        svc.database().execute(Insert(fined)).await.unwrap();

        let res = svc
            .execute(ConfirmBooking {
                initiator_id: renter.id,
                car_id: car.id,
                period: fixture::period_in(1, 3),
                payment: fixture::captured("150USD"),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::FinePending(_)));
    }

    #[tokio::test]
    async fn exactly_one_racer_wins() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let other = fixture::customer(None);
        svc.database().execute(Insert(other.clone())).await.unwrap();

        let first = svc.execute(ConfirmBooking {
            initiator_id: renter.id,
            car_id: car.id,
            period: fixture::period_in(1, 3),
            payment: fixture::captured("150USD"),
        });
        let second = svc.execute(ConfirmBooking {
            initiator_id: other.id,
            car_id: car.id,
            period: fixture::period_in(1, 3),
            payment: fixture::captured("150USD"),
        });

        let (first, second) = tokio::join!(first, second);
        assert_eq!(
            u8::from(first.is_ok()) + u8::from(second.is_ok()),
            1,
            "exactly one of the racing confirmations must win",
        );
        let lost = if first.is_err() { first } else { second };
        assert!(matches!(fixture::err_of(lost), E::CarAlreadyBooked(_)));
    }
}
