//! [`Query`] collection related to the multiple [`Booking`]s.
//!
//! [`Booking`]: crate::domain::Booking

use common::operations::By;

use crate::{
    domain::{user, Booking},
    read,
};

use super::DatabaseQuery;

/// Queries the [`Booking`]s of a user, newest first.
pub type OfUser = DatabaseQuery<By<Vec<Booking>, user::Id>>;

/// Queries an admin day schedule (pickups/returns due or overdue) for a
/// city.
pub type Schedule = DatabaseQuery<By<Vec<Booking>, read::booking::Schedule>>;

#[cfg(test)]
mod spec {
    use common::{operations::Insert, Date};

    use crate::{
        fixture,
        infra::Database as _,
        read::booking::{Schedule as ScheduleBy, ScheduleKind},
        Query as _,
    };

    use super::Schedule;

    #[tokio::test]
    async fn lists_pickups_due_today() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let city_id = car.city_id.unwrap();
        let due = fixture::confirmed_booking(
            &car,
            renter.id,
            fixture::period_in(0, 2),
        );
        svc.database().execute(Insert(due.clone())).await.unwrap();

        let pickups = svc
            .execute(Schedule::by(ScheduleBy {
                city_id,
                kind: ScheduleKind::Pickups,
                on: Date::today(),
            }))
            .await
            .unwrap();
        assert_eq!(
            pickups.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![due.id],
        );

        let overdue = svc
            .execute(Schedule::by(ScheduleBy {
                city_id,
                kind: ScheduleKind::PickupsOverdue,
                on: Date::today(),
            }))
            .await
            .unwrap();
        assert!(overdue.is_empty());
    }

    #[tokio::test]
    async fn overdue_pickup_moves_lists() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let city_id = car.city_id.unwrap();
        let missed = fixture::confirmed_booking(
            &car,
            renter.id,
            fixture::period_in(-1, 2),
        );
        svc.database().execute(Insert(missed.clone())).await.unwrap();

        let overdue = svc
            .execute(Schedule::by(ScheduleBy {
                city_id,
                kind: ScheduleKind::PickupsOverdue,
                on: Date::today(),
            }))
            .await
            .unwrap();
        assert_eq!(
            overdue.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![missed.id],
        );
    }
}
