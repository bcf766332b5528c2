//! [`Command`] for deleting a catalog [`Entry`].

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        catalog::{self, Entry},
        user, User,
    },
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for deleting a catalog [`Entry`].
///
/// A city is removed only if no [`User`] lives in it (cars and bookings
/// merely lose their city reference); a company, category or model is
/// removed only if no [`Car`] references it.
///
/// [`Car`]: crate::domain::Car
#[derive(Clone, Copy, Debug)]
pub struct DeleteCatalogEntry {
    /// ID of the [`User`] performing this [`Command`].
    pub initiator_id: user::Id,

    /// Reference to the [`Entry`] to delete.
    pub entry: catalog::EntryRef,
}

impl<Db> Command<DeleteCatalogEntry> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Entry>, catalog::EntryRef>>,
            Ok = Option<Entry>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::catalog::InUse, catalog::EntryRef>>,
            Ok = read::catalog::InUse,
            Err = Traced<database::Error>,
        > + Database<Delete<catalog::EntryRef>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteCatalogEntry,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteCatalogEntry {
            initiator_id,
            entry: entry_ref,
        } = cmd;

        let initiator = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;
        if initiator.role != user::Role::SuperAdmin {
            return Err(tracerr::new!(E::NotPermitted(initiator_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        drop(
            tx.execute(Select(By::<Option<Entry>, _>::new(entry_ref)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::EntryNotExists(entry_ref))
                .map_err(tracerr::wrap!())?,
        );

        let in_use = tx
            .execute(Select(By::<read::catalog::InUse, _>::new(entry_ref)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if in_use == true {
            return Err(tracerr::new!(E::EntryInUse(entry_ref)));
        }

        tx.execute(Delete(entry_ref))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)
    }
}

/// Error of [`DeleteCatalogEntry`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Catalog [`Entry`] is still referenced in a way blocking its removal.
    #[display("Catalog entry `{_0:?}` is still referenced")]
    EntryInUse(#[error(not(source))] catalog::EntryRef),

    /// Catalog [`Entry`] with the provided reference does not exist.
    #[display("Catalog entry `{_0:?}` does not exist")]
    EntryNotExists(#[error(not(source))] catalog::EntryRef),

    /// [`User`] is not permitted to manage reference data.
    #[display("`User(id: {_0})` is not permitted to manage reference data")]
    NotPermitted(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use crate::{
        domain::{
            catalog::{self, Entry},
            user::Role,
            Car,
        },
        fixture,
        infra::Database as _,
        Command as _,
    };

    use super::{DeleteCatalogEntry, ExecutionError as E};

    #[tokio::test]
    async fn rejects_city_with_residents() {
        let (svc, _, car) = fixture::rental_setup().await;
        let boss = fixture::user(Role::SuperAdmin, None);
        svc.database().execute(Insert(boss.clone())).await.unwrap();

        let res = svc
            .execute(DeleteCatalogEntry {
                initiator_id: boss.id,
                entry: catalog::EntryRef::City(car.city_id.unwrap()),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::EntryInUse(_)));
    }

    #[tokio::test]
    async fn deleting_city_unpins_cars() {
        let svc = fixture::service();
        let boss = fixture::user(Role::SuperAdmin, None);
        let mumbai = fixture::city("MUMBAI");
        let car = fixture::car(mumbai.id);
        let db = svc.database();
        db.execute(Insert(boss.clone())).await.unwrap();
        db.execute(Insert(Entry::City(mumbai.clone()))).await.unwrap();
        db.execute(Insert(car.clone())).await.unwrap();

        svc.execute(DeleteCatalogEntry {
            initiator_id: boss.id,
            entry: catalog::EntryRef::City(mumbai.id),
        })
        .await
        .unwrap();

        let unpinned = db
            .execute(Select(By::<Option<Car>, _>::new(car.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(unpinned.city_id.is_none());
    }

    #[tokio::test]
    async fn rejects_company_referenced_by_cars() {
        let svc = fixture::service();
        let boss = fixture::user(Role::SuperAdmin, None);
        let mumbai = fixture::city("MUMBAI");
        let company = crate::domain::car::Company {
            id: crate::domain::car::company::Id::new(),
            name: catalog::Name::new("TATA").unwrap(),
        };
        let mut car = fixture::car(mumbai.id);
        car.company_id = Some(company.id);
        let db = svc.database();
        db.execute(Insert(boss.clone())).await.unwrap();
        db.execute(Insert(Entry::City(mumbai))).await.unwrap();
        db.execute(Insert(Entry::CarCompany(company.clone())))
            .await
            .unwrap();
        db.execute(Insert(car)).await.unwrap();

        let res = svc
            .execute(DeleteCatalogEntry {
                initiator_id: boss.id,
                entry: catalog::EntryRef::CarCompany(company.id),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::EntryInUse(_)));
    }
}
