//! [`Query`] collection related to a single [`User`].

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{booking::Period, user, User},
    infra::{database, Database},
    read, Service,
};

use super::{DatabaseQuery, Query};

/// Queries a [`User`] by its [`user::Id`].
pub type ById = DatabaseQuery<By<Option<User>, user::Id>>;

/// [`Query`] checking whether a [`User`] is eligible to confirm a new
/// booking for the requested [`Period`].
///
/// A [`User`] is blocked while they hold an active booking overlapping the
/// [`Period`] or carry any unpaid fine.
#[derive(Clone, Copy, Debug)]
pub struct CanBook {
    /// ID of the [`User`] to check.
    pub user_id: user::Id,

    /// Requested rental [`Period`].
    pub period: Period,
}

impl<Db> Query<CanBook> for Service<Db>
where
    Db: Database<
            Select<By<read::booking::HasConflict, read::booking::UserConflict>>,
            Ok = read::booking::HasConflict,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::user::HasUnsettledFine, user::Id>>,
            Ok = read::user::HasUnsettledFine,
            Err = Traced<database::Error>,
        >,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(&self, query: CanBook) -> Result<Self::Ok, Self::Err> {
        let CanBook { user_id, period } = query;

        let fined = self
            .database()
            .execute(Select(By::<read::user::HasUnsettledFine, _>::new(
                user_id,
            )))
            .await
            .map_err(tracerr::wrap!())?;
        if fined == true {
            return Ok(false);
        }

        let conflict = self
            .database()
            .execute(Select(By::<read::booking::HasConflict, _>::new(
                read::booking::UserConflict { user_id, period },
            )))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(conflict == false)
    }
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{fixture, infra::Database as _, Query as _};

    use super::CanBook;

    #[tokio::test]
    async fn allows_clean_user() {
        let (svc, renter, _) = fixture::rental_setup().await;

        let ok = svc
            .execute(CanBook {
                user_id: renter.id,
                period: fixture::period_in(1, 3),
            })
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn blocks_on_overlapping_booking() {
        let (svc, renter, car) = fixture::rental_setup().await;
        svc.database()
            .execute(Insert(fixture::confirmed_booking(
                &car,
                renter.id,
                fixture::period_in(1, 3),
            )))
            .await
            .unwrap();

        let blocked = svc
            .execute(CanBook {
                user_id: renter.id,
                period: fixture::period_in(3, 5),
            })
            .await
            .unwrap();
        assert!(!blocked);

        let disjoint = svc
            .execute(CanBook {
                user_id: renter.id,
                period: fixture::period_in(4, 6),
            })
            .await
            .unwrap();
        assert!(disjoint);
    }

    #[tokio::test]
    async fn blocks_on_unsettled_fine_for_any_period() {
        let (svc, renter, car) = fixture::rental_setup().await;
        svc.database()
            .execute(Insert(fixture::returned_booking(
                &car,
                renter.id,
                fixture::period_in(-10, -8),
                Some(fixture::money("25USD")),
            )))
            .await
            .unwrap();

        let blocked = svc
            .execute(CanBook {
                user_id: renter.id,
                period: fixture::period_in(30, 33),
            })
            .await
            .unwrap();
        assert!(!blocked);
    }
}
