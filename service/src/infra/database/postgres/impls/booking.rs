//! [`Booking`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select, Update},
    Money,
};
use tracerr::Traced;

use crate::{
    domain::{
        booking::{self, Period},
        car, user, Booking,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `bookings` table, in the decoding order.
const COLUMNS: &str = "\
    id, car_id, user_id, status, \
    rented_from, rented_till, \
    pickup_city_id, delivery_city_id, \
    created_at, taken_at, returned_at, \
    review_on_said_date, review_on_said_time, review_proper_condition, \
    review_description, \
    fine_amount, fine_currency, fine_paid";

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(decode_booking))
    }
}

impl<C> Database<Select<By<Vec<Booking>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE user_id = $1::UUID \
             ORDER BY created_at DESC",
        );
        Ok(self
            .query(&sql, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(decode_booking)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Booking>, read::booking::Schedule>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, read::booking::Schedule>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::Schedule { city_id, kind, on } = by.into_inner();
        let confirmed = booking::Status::Confirmed;

        let conditions = match kind {
            read::booking::ScheduleKind::Pickups => {
                "taken_at IS NULL \
                 AND rented_from = $3::DATE \
                 AND pickup_city_id = $1::UUID"
            }
            read::booking::ScheduleKind::PickupsOverdue => {
                "taken_at IS NULL \
                 AND rented_from < $3::DATE \
                 AND pickup_city_id = $1::UUID"
            }
            read::booking::ScheduleKind::Returns => {
                "taken_at IS NOT NULL \
                 AND returned_at IS NULL \
                 AND rented_till = $3::DATE \
                 AND delivery_city_id = $1::UUID"
            }
            read::booking::ScheduleKind::ReturnsOverdue => {
                "taken_at IS NOT NULL \
                 AND returned_at IS NULL \
                 AND rented_till < $3::DATE \
                 AND delivery_city_id = $1::UUID"
            }
        };
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE status = $2::INT2 \
               AND {conditions} \
             ORDER BY rented_from, id",
        );
        Ok(self
            .query(&sql, &[&city_id, &confirmed, &on])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(decode_booking)
            .collect())
    }
}

impl<C>
    Database<
        Select<By<read::booking::HasConflict, read::booking::CarConflict>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::HasConflict;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::HasConflict, read::booking::CarConflict>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::CarConflict { car_id, period } = by.into_inner();
        let (rented_from, rented_till) = (period.from(), period.till());
        let confirmed = booking::Status::Confirmed;

        const SQL: &str = "\
            SELECT EXISTS(\
                SELECT 1 \
                FROM bookings \
                WHERE car_id = $1::UUID \
                  AND status = $2::INT2 \
                  AND rented_from <= $4::DATE \
                  AND $3::DATE <= rented_till\
            ) AS exists";
        self.query_opt(SQL, &[&car_id, &confirmed, &rented_from, &rented_till])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                read::booking::HasConflict(
                    row.expect("always exists").get("exists"),
                )
            })
    }
}

impl<C>
    Database<
        Select<By<read::booking::HasConflict, read::booking::UserConflict>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::HasConflict;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::booking::HasConflict, read::booking::UserConflict>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::UserConflict { user_id, period } = by.into_inner();
        let (rented_from, rented_till) = (period.from(), period.till());
        let confirmed = booking::Status::Confirmed;

        const SQL: &str = "\
            SELECT EXISTS(\
                SELECT 1 \
                FROM bookings \
                WHERE user_id = $1::UUID \
                  AND status = $2::INT2 \
                  AND rented_from <= $4::DATE \
                  AND $3::DATE <= rented_till\
            ) AS exists";
        self.query_opt(SQL, &[&user_id, &confirmed, &rented_from, &rented_till])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                read::booking::HasConflict(
                    row.expect("always exists").get("exists"),
                )
            })
    }
}

impl<C> Database<Select<By<read::booking::HasUpcoming, car::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::booking::HasUpcoming;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::booking::HasUpcoming, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let car_id: car::Id = by.into_inner();
        let confirmed = booking::Status::Confirmed;

        const SQL: &str = "\
            SELECT EXISTS(\
                SELECT 1 \
                FROM bookings \
                WHERE car_id = $1::UUID \
                  AND status = $2::INT2 \
                  AND rented_from >= CURRENT_DATE\
            ) AS exists";
        self.query_opt(SQL, &[&car_id, &confirmed])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                read::booking::HasUpcoming(
                    row.expect("always exists").get("exists"),
                )
            })
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Booking>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(booking))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            car_id,
            user_id,
            status,
            period,
            pickup_city_id,
            delivery_city_id,
            created_at,
            taken_at,
            returned_at,
            review,
        } = booking;
        let (rented_from, rented_till) = (period.from(), period.till());

        let (on_said_date, on_said_time, proper_condition, description, fine) =
            match review {
                Some(r) => (
                    Some(r.on_said_date),
                    Some(r.on_said_time),
                    Some(r.proper_condition),
                    Some(r.description),
                    r.fine,
                ),
                None => (None, None, None, None, None),
            };
        let (fine_amount, fine_currency, fine_paid) = match fine {
            Some(f) => {
                (Some(f.amount.amount), Some(f.amount.currency), Some(f.paid))
            }
            None => (None, None, None),
        };

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, car_id, user_id, status, \
                rented_from, rented_till, \
                pickup_city_id, delivery_city_id, \
                created_at, taken_at, returned_at, \
                review_on_said_date, review_on_said_time, \
                review_proper_condition, review_description, \
                fine_amount, fine_currency, fine_paid\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::INT2, \
                $5::DATE, $6::DATE, \
                $7::UUID, $8::UUID, \
                $9::TIMESTAMPTZ, $10::TIMESTAMPTZ, $11::TIMESTAMPTZ, \
                $12::BOOL, $13::BOOL, \
                $14::BOOL, $15::VARCHAR, \
                $16::NUMERIC, $17::INT2, $18::BOOL\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET car_id = EXCLUDED.car_id, \
                user_id = EXCLUDED.user_id, \
                status = EXCLUDED.status, \
                rented_from = EXCLUDED.rented_from, \
                rented_till = EXCLUDED.rented_till, \
                pickup_city_id = EXCLUDED.pickup_city_id, \
                delivery_city_id = EXCLUDED.delivery_city_id, \
                created_at = EXCLUDED.created_at, \
                taken_at = EXCLUDED.taken_at, \
                returned_at = EXCLUDED.returned_at, \
                review_on_said_date = EXCLUDED.review_on_said_date, \
                review_on_said_time = EXCLUDED.review_on_said_time, \
                review_proper_condition = EXCLUDED.review_proper_condition, \
                review_description = EXCLUDED.review_description, \
                fine_amount = EXCLUDED.fine_amount, \
                fine_currency = EXCLUDED.fine_currency, \
                fine_paid = EXCLUDED.fine_paid";
        self.exec(
            SQL,
            &[
                &id,
                &car_id,
                &user_id,
                &status,
                &rented_from,
                &rented_till,
                &pickup_city_id,
                &delivery_city_id,
                &created_at,
                &taken_at,
                &returned_at,
                &on_said_date,
                &on_said_time,
                &proper_condition,
                &description,
                &fine_amount,
                &fine_currency,
                &fine_paid,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

/// Decodes a [`Booking`] from the provided [`Row`].
///
/// [`Row`]: tokio_postgres::Row
fn decode_booking(row: tokio_postgres::Row) -> Booking {
    let period = Period::new(row.get("rented_from"), row.get("rented_till"))
        .expect("stored period is valid");

    let review = row
        .get::<_, Option<booking::Description>>("review_description")
        .map(|description| booking::Review {
            on_said_date: row.get("review_on_said_date"),
            on_said_time: row.get("review_on_said_time"),
            proper_condition: row.get("review_proper_condition"),
            description,
            fine: row.get::<_, Option<_>>("fine_amount").map(|amount| {
                booking::Fine {
                    amount: Money {
                        amount,
                        currency: row.get("fine_currency"),
                    },
                    paid: row.get("fine_paid"),
                }
            }),
        });

    Booking {
        id: row.get("id"),
        car_id: row.get("car_id"),
        user_id: row.get("user_id"),
        status: row.get("status"),
        period,
        pickup_city_id: row.get("pickup_city_id"),
        delivery_city_id: row.get("delivery_city_id"),
        created_at: row.get("created_at"),
        taken_at: row.get("taken_at"),
        returned_at: row.get("returned_at"),
        review,
    }
}
