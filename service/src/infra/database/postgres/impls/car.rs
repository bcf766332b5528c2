//! [`Car`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tracerr::Traced;

use crate::{
    domain::{booking, car, Car},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Select<By<Option<Car>, car::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Car>, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: car::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, plate, \
                   company_id, category_id, model_id, \
                   color, mileage, \
                   price_per_day, price_per_day_currency, \
                   min_rent, min_rent_currency, \
                   deposit, deposit_currency, \
                   city_id, is_available, created_at \
            FROM cars \
            WHERE id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(decode_car))
    }
}

impl<'p, C> Database<Select<By<Option<Car>, &'p car::Plate>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Car>, car::Id>>,
        Ok = Option<Car>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Car>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Car>, &'p car::Plate>>,
    ) -> Result<Self::Ok, Self::Err> {
        let plate = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM cars \
            WHERE plate = $1::VARCHAR \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[&plate])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let car_id = row.get("id");
        self.execute(Select(By::new(car_id)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Car>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Car>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(car): Insert<Car>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(car)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Car>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(car): Update<Car>,
    ) -> Result<Self::Ok, Self::Err> {
        let Car {
            id,
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
            is_available,
            created_at,
        } = car;
        let mileage = i64::from(mileage);

        const SQL: &str = "\
            INSERT INTO cars (\
                id, plate, \
                company_id, category_id, model_id, \
                color, mileage, \
                price_per_day, price_per_day_currency, \
                min_rent, min_rent_currency, \
                deposit, deposit_currency, \
                city_id, is_available, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, \
                $3::UUID, $4::UUID, $5::UUID, \
                $6::VARCHAR, $7::INT8, \
                $8::NUMERIC, $9::INT2, \
                $10::NUMERIC, $11::INT2, \
                $12::NUMERIC, $13::INT2, \
                $14::UUID, $15::BOOL, $16::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET plate = EXCLUDED.plate, \
                company_id = EXCLUDED.company_id, \
                category_id = EXCLUDED.category_id, \
                model_id = EXCLUDED.model_id, \
                color = EXCLUDED.color, \
                mileage = EXCLUDED.mileage, \
                price_per_day = EXCLUDED.price_per_day, \
                price_per_day_currency = EXCLUDED.price_per_day_currency, \
                min_rent = EXCLUDED.min_rent, \
                min_rent_currency = EXCLUDED.min_rent_currency, \
                deposit = EXCLUDED.deposit, \
                deposit_currency = EXCLUDED.deposit_currency, \
                city_id = EXCLUDED.city_id, \
                is_available = EXCLUDED.is_available, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &plate,
                &company_id,
                &category_id,
                &model_id,
                &color,
                &mileage,
                &price_per_day.amount,
                &price_per_day.currency,
                &min_rent.amount,
                &min_rent.currency,
                &deposit.amount,
                &deposit.currency,
                &city_id,
                &is_available,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Car, car::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Car, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: car::Id = by.into_inner();

        const SQL: &str = "DELETE FROM cars WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Car, car::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Car, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: car::Id = by.into_inner();

        // `DO UPDATE` (unlike `DO NOTHING`) locks the existing row, so a
        // second transaction blocks here until the first one commits.
        const SQL: &str = "\
            INSERT INTO cars_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<read::car::list::Page, read::car::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::car::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::car::list::Page, read::car::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::car::list::Selector { arguments, filter } = by.into_inner();
        let read::car::list::Filter { city_id, period } = filter;
        let (rented_from, rented_till) = (period.from(), period.till());

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;
        let confirmed = booking::Status::Confirmed;

        let mut ps: Vec<&(dyn ToSql + Sync)> =
            vec![&limit, &city_id, &rented_from, &rented_till, &confirmed];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM cars \
             WHERE is_available \
                   AND city_id = $2::UUID \
                   AND NOT EXISTS (\
                       SELECT 1 \
                       FROM bookings \
                       WHERE bookings.car_id = cars.id \
                         AND bookings.status = $5::INT2 \
                         AND bookings.rented_from <= $4::DATE \
                         AND $3::DATE <= bookings.rented_till\
                   ) \
                   {cursor} \
             ORDER BY id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            order = arguments.kind().order().sql(),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let id = row.get("id");
                (id, id)
            })
            .collect::<Vec<_>>();

        Ok(read::car::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C>
    Database<Select<By<read::car::list::TotalCount, read::car::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::car::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::car::list::TotalCount, read::car::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::car::list::Filter { city_id, period } = by.into_inner();
        let (rented_from, rented_till) = (period.from(), period.till());
        let confirmed = booking::Status::Confirmed;

        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM cars \
            WHERE is_available \
              AND city_id = $1::UUID \
              AND NOT EXISTS (\
                  SELECT 1 \
                  FROM bookings \
                  WHERE bookings.car_id = cars.id \
                    AND bookings.status = $4::INT2 \
                    AND bookings.rented_from <= $3::DATE \
                    AND $2::DATE <= bookings.rented_till\
              )";
        self.query_opt(SQL, &[&city_id, &rented_from, &rented_till, &confirmed])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}

/// Decodes a [`Car`] from the provided [`Row`].
///
/// [`Row`]: tokio_postgres::Row
fn decode_car(row: tokio_postgres::Row) -> Car {
    Car {
        id: row.get("id"),
        plate: row.get("plate"),
        company_id: row.get("company_id"),
        category_id: row.get("category_id"),
        model_id: row.get("model_id"),
        color: row.get("color"),
        mileage: u32::try_from(row.get::<_, i64>("mileage"))
            .unwrap_or_default(),
        price_per_day: Money {
            amount: row.get("price_per_day"),
            currency: row.get("price_per_day_currency"),
        },
        min_rent: Money {
            amount: row.get("min_rent"),
            currency: row.get("min_rent_currency"),
        },
        deposit: Money {
            amount: row.get("deposit"),
            currency: row.get("deposit_currency"),
        },
        city_id: row.get("city_id"),
        is_available: row.get("is_available"),
        created_at: row.get("created_at"),
    }
}
