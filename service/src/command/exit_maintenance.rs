//! [`Command`] for returning a [`Car`] to service.

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{booking, car, maintenance, user, Car, MaintenanceRecord, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for returning a serviced [`Car`] back into the rentable
/// fleet.
///
/// The counterpart of [`EnterMaintenance`]: the move is logged as an
/// append-only [`MaintenanceRecord`] and the [`Car`] is offered to renters
/// again.
///
/// [`EnterMaintenance`]: super::EnterMaintenance
#[derive(Clone, Debug)]
pub struct ExitMaintenance {
    /// ID of the [`User`] performing this [`Command`].
    pub initiator_id: user::Id,

    /// ID of the serviced [`Car`].
    pub car_id: car::Id,

    /// Outcome of the service.
    pub description: booking::Description,
}

impl<Db> Command<ExitMaintenance> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Car>, car::Id>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<Insert<MaintenanceRecord>, Err = Traced<database::Error>>
        + Database<Update<Car>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = MaintenanceRecord;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ExitMaintenance,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ExitMaintenance {
            initiator_id,
            car_id,
            description,
        } = cmd;

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

        let mut car = tx
            .execute(Select(By::<Option<Car>, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CarNotExists(car_id))
            .map_err(tracerr::wrap!())?;
        if car.is_available {
            return Err(tracerr::new!(E::NotInMaintenance(car_id)));
        }

        let record = MaintenanceRecord {
            id: maintenance::Id::new(),
            car_id: car.id,
            admin_id: initiator.id,
            kind: maintenance::Kind::Exit,
            description,
            created_at: DateTime::now().coerce(),
        };

        tx.execute(Insert(record.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        car.is_available = true;
        tx.execute(Update(car))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(record)
    }
}

/// Error of [`ExitMaintenance`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Car`] with the provided ID does not exist.
    #[display("`Car(id: {_0})` does not exist")]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`Car`] is not out of service.
    #[display("`Car(id: {_0})` is not in maintenance")]
    NotInMaintenance(#[error(not(source))] car::Id),

    /// [`User`] is not permitted to manage the fleet.
    #[display("`User(id: {_0})` is not permitted to manage the fleet")]
    NotPermitted(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use crate::{
        command::EnterMaintenance,
        domain::{booking::Description, maintenance, Car},
        fixture,
        infra::Database as _,
        Command as _,
    };

    use super::{ExecutionError as E, ExitMaintenance};

    #[tokio::test]
    async fn returns_car_to_service() {
        let (svc, _, car) = fixture::rental_setup().await;
        let mechanic = fixture::admin(car.city_id);
        svc.database()
            .execute(Insert(mechanic.clone()))
            .await
            .unwrap();
        drop(
            svc.execute(EnterMaintenance {
                initiator_id: mechanic.id,
                car_id: car.id,
                description: Description::new("brake pads").unwrap(),
            })
            .await
            .unwrap(),
        );

        let record = svc
            .execute(ExitMaintenance {
                initiator_id: mechanic.id,
                car_id: car.id,
                description: Description::new("pads replaced").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(record.kind, maintenance::Kind::Exit);
        let stored = svc
            .database()
            .execute(Select(By::<Option<Car>, _>::new(car.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_available);
        assert_eq!(svc.database().maintenance_records(car.id).len(), 2);
    }

    #[tokio::test]
    async fn rejects_in_service_car() {
        let (svc, _, car) = fixture::rental_setup().await;
        let mechanic = fixture::admin(car.city_id);
        svc.database()
            .execute(Insert(mechanic.clone()))
            .await
            .unwrap();

        let res = svc
            .execute(ExitMaintenance {
                initiator_id: mechanic.id,
                car_id: car.id,
                description: Description::new("nothing to do").unwrap(),
            })
            .await;
        assert!(matches!(fixture::err_of(res), E::NotInMaintenance(_)));
    }
}
