//! [`Query`] collection related to the multiple [`Car`]s.
//!
//! [`Car`]: crate::domain::Car

use common::operations::By;

use crate::read;

use super::DatabaseQuery;

/// Queries a page of [`Car`]s available for the requested city and period.
///
/// [`Car`]: crate::domain::Car
pub type Available =
    DatabaseQuery<By<read::car::list::Page, read::car::list::Selector>>;

/// Queries the total count of available [`Car`]s for a filter.
///
/// [`Car`]: crate::domain::Car
pub type TotalCount =
    DatabaseQuery<By<read::car::list::TotalCount, read::car::list::Filter>>;

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{fixture, infra::Database as _, read::car::list, Query as _};

    use super::{Available, TotalCount};

    #[tokio::test]
    async fn excludes_booked_and_serviced_cars() {
        let (svc, renter, free) = fixture::rental_setup().await;
        let city_id = free.city_id.unwrap();
        let booked = fixture::car(city_id);
        let mut serviced = fixture::car(city_id);
        serviced.is_available = false;
        let db = svc.database();
        db.execute(Insert(booked.clone())).await.unwrap();
        db.execute(Insert(serviced)).await.unwrap();
        db.execute(Insert(fixture::confirmed_booking(
            &booked,
            renter.id,
            fixture::period_in(1, 3),
        )))
        .await
        .unwrap();

        let filter = list::Filter {
            city_id,
            period: fixture::period_in(2, 4),
        };
        let page = svc
            .execute(Available::by(list::Selector {
                arguments: list::Arguments::Forward {
                    first: 10,
                    after: None,
                    including: false,
                },
                filter,
            }))
            .await
            .unwrap();

        assert_eq!(
            page.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
            vec![free.id],
        );
        assert!(!page.has_more);

        let total = svc.execute(TotalCount::by(filter)).await.unwrap();
        assert_eq!(i32::from(total), 1);
    }

    #[tokio::test]
    async fn booked_car_reappears_for_disjoint_period() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let city_id = car.city_id.unwrap();
        svc.database()
            .execute(Insert(fixture::confirmed_booking(
                &car,
                renter.id,
                fixture::period_in(1, 3),
            )))
            .await
            .unwrap();

        let page = svc
            .execute(Available::by(list::Selector {
                arguments: list::Arguments::Forward {
                    first: 10,
                    after: None,
                    including: false,
                },
                filter: list::Filter {
                    city_id,
                    period: fixture::period_in(4, 6),
                },
            }))
            .await
            .unwrap();

        assert_eq!(page.edges.len(), 1);
    }

    #[tokio::test]
    async fn paginates_forward_in_stable_order() {
        let (svc, _, first_car) = fixture::rental_setup().await;
        let city_id = first_car.city_id.unwrap();
        let db = svc.database();
        db.execute(Insert(fixture::car(city_id))).await.unwrap();
        db.execute(Insert(fixture::car(city_id))).await.unwrap();

        let filter = list::Filter {
            city_id,
            period: fixture::period_in(1, 3),
        };
        let head = svc
            .execute(Available::by(list::Selector {
                arguments: list::Arguments::Forward {
                    first: 2,
                    after: None,
                    including: false,
                },
                filter,
            }))
            .await
            .unwrap();
        assert_eq!(head.edges.len(), 2);
        assert!(head.has_more);

        let tail = svc
            .execute(Available::by(list::Selector {
                arguments: list::Arguments::Forward {
                    first: 2,
                    after: head.page_info().end_cursor,
                    including: false,
                },
                filter,
            }))
            .await
            .unwrap();
        assert_eq!(tail.edges.len(), 1);
        assert!(!tail.has_more);

        let mut seen = head
            .edges
            .iter()
            .chain(tail.edges.iter())
            .map(|e| e.node)
            .collect::<Vec<_>>();
        seen.dedup();
        assert_eq!(seen.len(), 3, "pages must not overlap");
    }
}
