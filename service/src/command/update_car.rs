//! [`Command`] for updating a [`Car`] of the fleet.

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{car, city, user, Car, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`Car`] of the fleet.
///
/// Replaces the mutable attributes wholesale, the way an admin edit form
/// submits them. A changed [`car::Plate`] is re-canonicalized (by
/// construction) and re-checked for uniqueness.
#[derive(Clone, Debug)]
pub struct UpdateCar {
    /// ID of the [`User`] performing this [`Command`].
    pub initiator_id: user::Id,

    /// ID of the [`Car`] to update.
    pub car_id: car::Id,

    /// New canonicalized [`car::Plate`].
    pub plate: car::Plate,

    /// New ID of the manufacturing [`car::Company`], if known.
    pub company_id: Option<car::company::Id>,

    /// New ID of the [`car::Category`], if known.
    pub category_id: Option<car::category::Id>,

    /// New ID of the [`car::Model`], if known.
    pub model_id: Option<car::model::Id>,

    /// New [`car::Color`].
    pub color: car::Color,

    /// New [`car::Mileage`].
    pub mileage: car::Mileage,

    /// New price of renting the [`Car`] for one day.
    pub price_per_day: Money,

    /// New minimum rent.
    pub min_rent: Money,

    /// New deposit.
    pub deposit: Money,

    /// New ID of the [`City`] the [`Car`] is located in.
    ///
    /// [`City`]: crate::domain::City
    pub city_id: Option<city::Id>,
}

impl<Db> Command<UpdateCar> for Service<Db>
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
        > + for<'p> Database<
            Select<By<Option<Car>, &'p car::Plate>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<Update<Car>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Car;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateCar) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateCar {
            initiator_id,
            car_id,
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

        let mut car = tx
            .execute(Select(By::<Option<Car>, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CarNotExists(car_id))
            .map_err(tracerr::wrap!())?;

        if car.plate != plate {
            let occupied = tx
                .execute(Select(By::<Option<Car>, _>::new(&plate)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if occupied.is_some() {
                return Err(tracerr::new!(E::PlateOccupied(plate)));
            }
        }

        car.plate = plate;
        car.company_id = company_id;
        car.category_id = category_id;
        car.model_id = model_id;
        car.color = color;
        car.mileage = mileage;
        car.price_per_day = price_per_day;
        car.min_rent = min_rent;
        car.deposit = deposit;
        car.city_id = city_id;

        tx.execute(Update(car.clone()))
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

/// Error of [`UpdateCar`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Car`] with the provided ID does not exist.
    #[display("`Car(id: {_0})` does not exist")]
    CarNotExists(#[error(not(source))] car::Id),

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
        domain::{car, Car, User},
        fixture,
        infra::Database as _,
        Command as _,
    };

    use super::{ExecutionError as E, UpdateCar};

    fn cmd(boss: &User, car: &Car) -> UpdateCar {
        UpdateCar {
            initiator_id: boss.id,
            car_id: car.id,
            plate: car.plate.clone(),
            company_id: car.company_id,
            category_id: car.category_id,
            model_id: car.model_id,
            color: car.color.clone(),
            mileage: car.mileage,
            price_per_day: car.price_per_day,
            min_rent: car.min_rent,
            deposit: car.deposit,
            city_id: car.city_id,
        }
    }

    #[tokio::test]
    async fn replaces_mutable_attributes() {
        let (svc, _, car) = fixture::rental_setup().await;
        let boss = fixture::admin(car.city_id);
        svc.database().execute(Insert(boss.clone())).await.unwrap();

        let mut update = cmd(&boss, &car);
        update.color = car::Color::new("black").unwrap();
        update.mileage = 42_000;
        update.price_per_day = fixture::money("60USD");
        let updated = svc.execute(update).await.unwrap();
        assert_eq!(updated.mileage, 42_000);

        let stored = svc
            .database()
            .execute(Select(By::<Option<Car>, _>::new(car.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.color, car::Color::new("black").unwrap());
        assert_eq!(stored.price_per_day, fixture::money("60USD"));
    }

    #[tokio::test]
    async fn keeping_own_plate_is_not_an_occupation() {
        let (svc, _, car) = fixture::rental_setup().await;
        let boss = fixture::admin(car.city_id);
        svc.database().execute(Insert(boss.clone())).await.unwrap();

        let updated = svc.execute(cmd(&boss, &car)).await.unwrap();
        assert_eq!(updated.plate, car.plate);
    }

    #[tokio::test]
    async fn rejects_plate_of_another_car() {
        let (svc, _, car) = fixture::rental_setup().await;
        let boss = fixture::admin(car.city_id);
        svc.database().execute(Insert(boss.clone())).await.unwrap();
        let other = fixture::car(car.city_id.unwrap());
        svc.database().execute(Insert(other.clone())).await.unwrap();

        let mut update = cmd(&boss, &car);
        update.plate = other.plate.clone();
        let res = svc.execute(update).await;
        assert!(matches!(fixture::err_of(res), E::PlateOccupied(_)));
    }
}
