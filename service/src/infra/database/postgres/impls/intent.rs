//! [`RentalIntent`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Select, Upsert},
    Date,
};
use tracerr::Traced;

use crate::{
    domain::{booking::Period, user, RentalIntent},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<RentalIntent>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<RentalIntent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<RentalIntent>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT user_id, rented_from, rented_till, city_id, created_at \
            FROM rental_intents \
            WHERE user_id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| RentalIntent {
                user_id: row.get("user_id"),
                period: Period::new(
                    row.get("rented_from"),
                    row.get("rented_till"),
                )
                .expect("stored period is valid"),
                city_id: row.get("city_id"),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Upsert<RentalIntent>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Upsert(intent): Upsert<RentalIntent>,
    ) -> Result<Self::Ok, Self::Err> {
        let RentalIntent {
            user_id,
            period,
            city_id,
            created_at,
        } = intent;
        let (rented_from, rented_till) = (period.from(), period.till());

        const SQL: &str = "\
            INSERT INTO rental_intents (\
                user_id, rented_from, rented_till, city_id, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::DATE, $3::DATE, $4::UUID, $5::TIMESTAMPTZ\
            ) \
            ON CONFLICT (user_id) DO UPDATE \
            SET rented_from = EXCLUDED.rented_from, \
                rented_till = EXCLUDED.rented_till, \
                city_id = EXCLUDED.city_id, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[&user_id, &rented_from, &rented_till, &city_id, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<RentalIntent, Date>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<RentalIntent, Date>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let today: Date = by.into_inner();

        const SQL: &str = "\
            DELETE FROM rental_intents \
            WHERE rented_from < $1::DATE";
        self.exec(SQL, &[&today])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
