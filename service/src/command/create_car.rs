//! [`Command`] for adding a new [`Car`] to the fleet.

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{car, city, user, Car, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for adding a new [`Car`] to the fleet.
#[derive(Clone, Debug)]
pub struct CreateCar {
    /// ID of the [`User`] performing this [`Command`].
    pub initiator_id: user::Id,

    /// Canonicalized [`car::Plate`] of a new [`Car`].
    pub plate: car::Plate,

    /// ID of the manufacturing [`car::Company`], if known.
    pub company_id: Option<car::company::Id>,

    /// ID of the [`car::Category`], if known.
    pub category_id: Option<car::category::Id>,

    /// ID of the [`car::Model`], if known.
    pub model_id: Option<car::model::Id>,

    /// [`car::Color`] of a new [`Car`].
    pub color: car::Color,

    /// [`car::Mileage`] of a new [`Car`].
    pub mileage: car::Mileage,

    /// Price of renting a new [`Car`] for one day.
    pub price_per_day: Money,

    /// Minimum rent to be paid for a new [`Car`].
    pub min_rent: Money,

    /// Deposit to be paid at the beginning of the rent.
    pub deposit: Money,

    /// ID of the [`City`] a new [`Car`] is located in.
    ///
    /// [`City`]: crate::domain::City
    pub city_id: Option<city::Id>,
}

impl<Db> Command<CreateCar> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'p> Database<
            Select<By<Option<Car>, &'p car::Plate>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<Insert<Car>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Car;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateCar) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateCar {
            initiator_id,
            plate,
            company_id,
            category_id,
            model_id,
            color,
            mileage,
            price_per_day,
            min_rent,
            deposit,
            city_id,
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

        let occupied = tx
            .execute(Select(By::<Option<Car>, _>::new(&plate)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupied.is_some() {
            return Err(tracerr::new!(E::PlateOccupied(plate)));
        }

        let car = Car {
            id: car::Id::new(),
            plate,
            company_id,
            category_id,
            model_id,
            color,
            mileage,
            price_per_day,
            min_rent,
            deposit,
            city_id,
            is_available: true,
            created_at: DateTime::now().coerce(),
        };

        tx.execute(Insert(car.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(car)
    }
}

/// Error of [`CreateCar`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] is not permitted to manage the fleet.
    #[display("`User(id: {_0})` is not permitted to manage the fleet")]
    NotPermitted(#[error(not(source))] user::Id),

    /// Another [`Car`] already carries the canonicalized [`car::Plate`].
    #[display("`{_0}` plate is occupied")]
    PlateOccupied(#[error(not(source))] car::Plate),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use crate::{
        domain::{car, user, Car},
        fixture,
        infra::Database as _,
        Command as _,
    };

    use super::{CreateCar, ExecutionError as E};

    fn cmd(initiator_id: user::Id, plate: &str) -> CreateCar {
        CreateCar {
            initiator_id,
            plate: car::Plate::new(plate).unwrap(),
            company_id: None,
            category_id: None,
            model_id: None,
            color: car::Color::new("red").unwrap(),
            mileage: 25_000,
            price_per_day: fixture::money("40USD"),
            min_rent: fixture::money("80USD"),
            deposit: fixture::money("150USD"),
            city_id: None,
        }
    }

    #[tokio::test]
    async fn persists_available_car() {
        let (svc, _, _) = fixture::rental_setup().await;
        let boss = fixture::admin(None);
        svc.database().execute(Insert(boss.clone())).await.unwrap();

        let car = svc.execute(cmd(boss.id, "dl 01 ab 0001")).await.unwrap();
        assert!(car.is_available);
        assert_eq!(car.plate, car::Plate::new("DL01AB0001").unwrap());

        let stored = svc
            .database()
            .execute(Select(By::<Option<Car>, _>::new(car.id)))
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn rejects_occupied_plate() {
        let (svc, _, existing) = fixture::rental_setup().await;
        let boss = fixture::admin(None);
        svc.database().execute(Insert(boss.clone())).await.unwrap();

        let res = svc.execute(cmd(boss.id, existing.plate.as_ref())).await;
        assert!(matches!(fixture::err_of(res), E::PlateOccupied(_)));
    }

    #[tokio::test]
    async fn requires_admin() {
        let (svc, renter, _) = fixture::rental_setup().await;

        let res = svc.execute(cmd(renter.id, "DL01AB0002")).await;
        assert!(matches!(fixture::err_of(res), E::NotPermitted(_)));
    }
}
