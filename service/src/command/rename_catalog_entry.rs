//! [`Command`] for renaming a catalog [`Entry`].

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        catalog::{self, Entry},
        user, User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for renaming a catalog [`Entry`].
///
/// The new name is canonicalized (by [`catalog::Name`] construction) and
/// re-checked for uniqueness within its [`catalog::Kind`].
#[derive(Clone, Debug)]
pub struct RenameCatalogEntry {
    /// ID of the [`User`] performing this [`Command`].
    pub initiator_id: user::Id,

    /// Reference to the [`Entry`] to rename.
    pub entry: catalog::EntryRef,

    /// New canonicalized [`catalog::Name`].
    pub name: catalog::Name,
}

impl<Db> Command<RenameCatalogEntry> for Service<Db>
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
            Select<By<Option<Entry>, catalog::Lookup>>,
            Ok = Option<Entry>,
            Err = Traced<database::Error>,
        > + Database<Update<Entry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Entry;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RenameCatalogEntry,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RenameCatalogEntry {
            initiator_id,
            entry: entry_ref,
            name,
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

        let mut entry = tx
            .execute(Select(By::<Option<Entry>, _>::new(entry_ref)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::EntryNotExists(entry_ref))
            .map_err(tracerr::wrap!())?;

        if *entry.name() != name {
            let occupied = tx
                .execute(Select(By::<Option<Entry>, _>::new(catalog::Lookup {
                    kind: entry_ref.kind(),
                    name: name.clone(),
                })))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if occupied.is_some() {
                return Err(tracerr::new!(E::NameOccupied(name)));
            }

            entry.rename(name);
            tx.execute(Update(entry.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(entry)
    }
}

/// Error of [`RenameCatalogEntry`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Catalog [`Entry`] with the provided reference does not exist.
    #[display("Catalog entry `{_0:?}` does not exist")]
    EntryNotExists(#[error(not(source))] catalog::EntryRef),

    /// Another [`Entry`] of the same [`catalog::Kind`] already carries the
    /// canonicalized [`catalog::Name`].
    #[display("`{_0}` name is occupied")]
    NameOccupied(#[error(not(source))] catalog::Name),

    /// [`User`] is not permitted to manage reference data.
    #[display("`User(id: {_0})` is not permitted to manage reference data")]
    NotPermitted(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::{
            catalog::{self, Entry},
            city,
            user::Role,
        },
        fixture,
        infra::Database as _,
        Command as _,
    };

    use super::{ExecutionError as E, RenameCatalogEntry};

    #[tokio::test]
    async fn renames_city() {
        let svc = fixture::service();
        let boss = fixture::user(Role::SuperAdmin, None);
        let delhi = fixture::city("DELHI");
        let db = svc.database();
        db.execute(Insert(boss.clone())).await.unwrap();
        db.execute(Insert(Entry::City(delhi.clone()))).await.unwrap();

        let renamed = svc
            .execute(RenameCatalogEntry {
                initiator_id: boss.id,
                entry: catalog::EntryRef::City(delhi.id),
                name: catalog::Name::new(" new  delhi ").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(renamed.name().to_string(), "NEWDELHI");
    }

    #[tokio::test]
    async fn rejects_occupied_name() {
        let svc = fixture::service();
        let boss = fixture::user(Role::SuperAdmin, None);
        let delhi = fixture::city("DELHI");
        let mumbai = fixture::city("MUMBAI");
        let db = svc.database();
        db.execute(Insert(boss.clone())).await.unwrap();
        db.execute(Insert(Entry::City(delhi.clone()))).await.unwrap();
        db.execute(Insert(Entry::City(mumbai))).await.unwrap();

        let res = svc
            .execute(RenameCatalogEntry {
                initiator_id: boss.id,
                entry: catalog::EntryRef::City(delhi.id),
                name: catalog::Name::new("mum bai").unwrap(),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::NameOccupied(_)));
    }

    #[tokio::test]
    async fn renaming_to_same_name_is_noop() {
        let svc = fixture::service();
        let boss = fixture::user(Role::SuperAdmin, None);
        let delhi = fixture::city("DELHI");
        let db = svc.database();
        db.execute(Insert(boss.clone())).await.unwrap();
        db.execute(Insert(Entry::City(delhi.clone()))).await.unwrap();

        let renamed = svc
            .execute(RenameCatalogEntry {
                initiator_id: boss.id,
                entry: catalog::EntryRef::City(delhi.id),
                name: catalog::Name::new("delhi").unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(renamed.name().to_string(), "DELHI");
    }

    #[tokio::test]
    async fn rejects_missing_entry() {
        let svc = fixture::service();
        let boss = fixture::user(Role::SuperAdmin, None);
        svc.database().execute(Insert(boss.clone())).await.unwrap();

        let res = svc
            .execute(RenameCatalogEntry {
                initiator_id: boss.id,
                entry: catalog::EntryRef::City(city::Id::new()),
                name: catalog::Name::new("GHOST").unwrap(),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::EntryNotExists(_)));
    }
}
