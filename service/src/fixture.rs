//! Shared helpers for [`Command`] and [`Query`] tests.
//!
//! [`Command`]: crate::Command
//! [`Query`]: crate::Query

use std::time::Duration;

use common::{operations::Insert, Date, DateTime, Money};
use jsonwebtoken::{DecodingKey, EncodingKey};
use tracerr::Traced;
use uuid::Uuid;

use crate::{
    domain::{
        booking::{self, Period},
        car,
        catalog::{self, Entry},
        city, user, Booking, Car, City, PaymentConfirmation, User,
    },
    infra::{database::in_memory::InMemory, Database as _},
    task, Config, Service,
};

/// Creates a [`Service`] backed by an empty [`InMemory`] database.
///
/// No background tasks are spawned: tests drive every operation explicitly.
pub(crate) fn service() -> Service<InMemory> {
    Service {
        config: Config {
            jwt_encoding_key: EncodingKey::from_secret(b"secret"),
            jwt_decoding_key: DecodingKey::from_secret(b"secret"),
            clean_stale_intents: task::clean_stale_intents::Config {
                interval: Duration::from_secs(60 * 60),
            },
        },
        database: InMemory::default(),
    }
}

/// Extracts the error out of a [`Traced`] command result.
pub(crate) fn err_of<T, E>(res: Result<T, Traced<E>>) -> E {
    let (e, _) = res.err().unwrap().split();
    e
}

/// Returns the [`Date`] lying the given number of `days` from today.
pub(crate) fn date_in(days: i64) -> Date {
    Date::from(
        time::Date::from(Date::today())
            .checked_add(time::Duration::days(days))
            .unwrap(),
    )
}

/// Returns the [`Period`] spanning the given offsets from today, inclusive.
pub(crate) fn period_in(from: i64, till: i64) -> Period {
    Period::new(date_in(from), date_in(till)).unwrap()
}

/// Parses the given string as [`Money`].
pub(crate) fn money(s: &str) -> Money {
    s.parse().unwrap()
}

/// Returns a captured [`PaymentConfirmation`] of the given amount.
pub(crate) fn captured(amount: &str) -> PaymentConfirmation {
    PaymentConfirmation {
        is_captured: true,
        amount: money(amount),
    }
}

/// Creates a [`City`] with the given name.
pub(crate) fn city(name: &str) -> City {
    City {
        id: city::Id::new(),
        name: catalog::Name::new(name).unwrap(),
    }
}

/// Creates a verified [`User`] with the given [`user::Role`].
pub(crate) fn user(role: user::Role, city_id: Option<city::Id>) -> User {
    User {
        id: user::Id::new(),
        name: user::Name::new("Test User").unwrap(),
        login: user::Login::new(format!("u{}", Uuid::new_v4().simple()))
            .unwrap(),
        password_hash: user::PasswordHash::new(&user::Password::from(
            "qwerty123",
        )),
        email: None,
        role,
        is_verified: true,
        city_id,
        created_at: DateTime::now().coerce(),
    }
}

/// Creates a verified [`user::Role::Customer`].
pub(crate) fn customer(city_id: Option<city::Id>) -> User {
    user(user::Role::Customer, city_id)
}

/// Creates a verified [`user::Role::Admin`].
pub(crate) fn admin(city_id: Option<city::Id>) -> User {
    user(user::Role::Admin, city_id)
}

/// Creates an in-service [`Car`] located in the given [`City`].
pub(crate) fn car(city_id: city::Id) -> Car {
    Car {
        id: car::Id::new(),
        plate: car::Plate::new(format!(
            "DL{}",
            &Uuid::new_v4().simple().to_string()[..8],
        ))
        .unwrap(),
        company_id: None,
        category_id: None,
        model_id: None,
        color: car::Color::new("white").unwrap(),
        mileage: 10_000,
        price_per_day: money("50USD"),
        min_rent: money("100USD"),
        deposit: money("200USD"),
        city_id: Some(city_id),
        is_available: true,
        created_at: DateTime::now().coerce(),
    }
}

/// Creates a [`Service`] seeded with a [`City`], a verified customer living
/// there and an in-service [`Car`] located there.
pub(crate) async fn rental_setup() -> (Service<InMemory>, User, Car) {
    let svc = service();
    let delhi = city("DELHI");
    let renter = customer(Some(delhi.id));
    let rented = car(delhi.id);

    let db = svc.database();
    db.execute(Insert(Entry::City(delhi))).await.unwrap();
    db.execute(Insert(renter.clone())).await.unwrap();
    db.execute(Insert(rented.clone())).await.unwrap();

    (svc, renter, rented)
}

/// Creates a confirmed [`Booking`] of the given [`Car`] awaiting pickup.
pub(crate) fn confirmed_booking(
    car: &Car,
    user_id: user::Id,
    period: Period,
) -> Booking {
    Booking {
        id: booking::Id::new(),
        car_id: Some(car.id),
        user_id,
        status: booking::Status::Confirmed,
        period,
        pickup_city_id: car.city_id,
        delivery_city_id: car.city_id,
        created_at: DateTime::now().coerce(),
        taken_at: None,
        returned_at: None,
        review: None,
    }
}

/// Creates a finished [`Booking`] of the given [`Car`], reviewed on return
/// with an optional unpaid fine.
pub(crate) fn returned_booking(
    car: &Car,
    user_id: user::Id,
    period: Period,
    fine: Option<Money>,
) -> Booking {
    Booking {
        id: booking::Id::new(),
        car_id: Some(car.id),
        user_id,
        status: booking::Status::Confirmed,
        period,
        pickup_city_id: car.city_id,
        delivery_city_id: car.city_id,
        created_at: DateTime::now().coerce(),
        taken_at: Some(DateTime::now().coerce()),
        returned_at: Some(DateTime::now().coerce()),
        review: Some(booking::Review {
            on_said_date: true,
            on_said_time: true,
            proper_condition: fine.is_none(),
            description: booking::Description::new("inspected").unwrap(),
            fine: fine.map(|amount| booking::Fine {
                amount,
                paid: false,
            }),
        }),
    }
}
