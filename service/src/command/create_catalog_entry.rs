//! [`Command`] for creating a new catalog [`Entry`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        car,
        catalog::{self, Entry},
        city, user, User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new catalog [`Entry`].
///
/// Only a [`user::Role::SuperAdmin`] manages reference data.
#[derive(Clone, Debug)]
pub struct CreateCatalogEntry {
    /// ID of the [`User`] performing this [`Command`].
    pub initiator_id: user::Id,

    /// [`catalog::Kind`] of the [`Entry`] to create.
    pub kind: catalog::Kind,

    /// Canonicalized [`catalog::Name`] of the [`Entry`] to create.
    pub name: catalog::Name,

    /// ID of the manufacturing [`car::Company`], when a [`car::Model`] is
    /// created.
    pub company_id: Option<car::company::Id>,
}

impl<Db> Command<CreateCatalogEntry> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Entry>, catalog::Lookup>>,
            Ok = Option<Entry>,
            Err = Traced<database::Error>,
        > + Database<Insert<Entry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Entry;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateCatalogEntry,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateCatalogEntry {
            initiator_id,
            kind,
            name,
            company_id,
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

        let occupied = tx
            .execute(Select(By::<Option<Entry>, _>::new(catalog::Lookup {
                kind,
                name: name.clone(),
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupied.is_some() {
            return Err(tracerr::new!(E::NameOccupied(name)));
        }

        let entry = match kind {
            catalog::Kind::City => Entry::from(city::City {
                id: city::Id::new(),
                name,
            }),
            catalog::Kind::CarCompany => Entry::from(car::Company {
                id: car::company::Id::new(),
                name,
            }),
            catalog::Kind::CarCategory => Entry::from(car::Category {
                id: car::category::Id::new(),
                name,
            }),
            catalog::Kind::CarModel => Entry::from(car::Model {
                id: car::model::Id::new(),
                name,
                company_id,
            }),
        };

        tx.execute(Insert(entry.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(entry)
    }
}

/// Error of [`CreateCatalogEntry`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

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
        domain::{catalog, user::Role},
        fixture,
        infra::Database as _,
        Command as _,
    };

    use super::{CreateCatalogEntry, ExecutionError as E};

    #[tokio::test]
    async fn creates_city() {
        let svc = fixture::service();
        let boss = fixture::user(Role::SuperAdmin, None);
        svc.database().execute(Insert(boss.clone())).await.unwrap();

        let entry = svc
            .execute(CreateCatalogEntry {
                initiator_id: boss.id,
                kind: catalog::Kind::City,
                name: catalog::Name::new(" new  delhi ").unwrap(),
                company_id: None,
            })
            .await
            .unwrap();

        assert_eq!(entry.name().to_string(), "NEWDELHI");
    }

    #[tokio::test]
    async fn rejects_occupied_canonical_name() {
        let svc = fixture::service();
        let boss = fixture::user(Role::SuperAdmin, None);
        svc.database().execute(Insert(boss.clone())).await.unwrap();
        drop(
            svc.execute(CreateCatalogEntry {
                initiator_id: boss.id,
                kind: catalog::Kind::City,
                name: catalog::Name::new("NEWDELHI").unwrap(),
                company_id: None,
            })
            .await
            .unwrap(),
        );

        let res = svc
            .execute(CreateCatalogEntry {
                initiator_id: boss.id,
                kind: catalog::Kind::City,
                name: catalog::Name::new(" new  delhi ").unwrap(),
                company_id: None,
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::NameOccupied(_)));
    }

    #[tokio::test]
    async fn same_name_allowed_across_kinds() {
        let svc = fixture::service();
        let boss = fixture::user(Role::SuperAdmin, None);
        svc.database().execute(Insert(boss.clone())).await.unwrap();
        drop(
            svc.execute(CreateCatalogEntry {
                initiator_id: boss.id,
                kind: catalog::Kind::City,
                name: catalog::Name::new("PHOENIX").unwrap(),
                company_id: None,
            })
            .await
            .unwrap(),
        );

        svc.execute(CreateCatalogEntry {
            initiator_id: boss.id,
            kind: catalog::Kind::CarModel,
            name: catalog::Name::new("PHOENIX").unwrap(),
            company_id: None,
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn rejects_plain_admin() {
        let svc = fixture::service();
        let desk = fixture::admin(None);
        svc.database().execute(Insert(desk.clone())).await.unwrap();

        let res = svc
            .execute(CreateCatalogEntry {
                initiator_id: desk.id,
                kind: catalog::Kind::City,
                name: catalog::Name::new("NEWDELHI").unwrap(),
                company_id: None,
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::NotPermitted(_)));
    }
}
