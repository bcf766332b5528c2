//! In-memory [`Database`] backing the unit tests.
//!
//! Mirrors the relational backend closely enough for command semantics:
//! upserts, referential nulling on removal, and a per-[`Car`] lock honored
//! between [`Transact`] and [`Commit`].

use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex, RwLock},
};

use common::{
    operations::{
        By, Commit, Delete, Insert, Lock, Select, Transact, Update, Upsert,
    },
    pagination::Kind,
    Date,
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracerr::Traced;
use uuid::Uuid;

use crate::{
    domain::{
        booking, car,
        catalog::{self, Entry},
        city, user, Booking, Car, City, MaintenanceRecord, RentalIntent, User,
    },
    infra::{database, Database},
    read,
};

/// In-memory [`Database`].
#[derive(Clone, Debug, Default)]
pub(crate) struct InMemory {
    /// Shared [`Store`] of this [`Database`].
    store: Arc<Store>,
}

impl InMemory {
    /// Returns all the recorded [`MaintenanceRecord`]s of the given [`Car`].
    pub(crate) fn maintenance_records(
        &self,
        car_id: car::Id,
    ) -> Vec<MaintenanceRecord> {
        self.store
            .tables
            .read()
            .unwrap()
            .maintenance
            .iter()
            .filter(|r| r.car_id == car_id)
            .cloned()
            .collect()
    }
}

/// Transactional handle over an [`InMemory`] database.
///
/// There is no rollback: writes land immediately, which is enough for the
/// command tests. What matters is that a [`Lock`]ed [`Car`] stays locked
/// until [`Commit`] (or drop), so racing confirmations serialize.
pub(crate) struct Tx {
    /// Shared [`Store`] of the [`InMemory`] database.
    store: Arc<Store>,

    /// Per-[`Car`] lock guards held until [`Commit`].
    held: StdMutex<Vec<OwnedMutexGuard<()>>>,
}

/// Storage shared between [`InMemory`] clones and [`Tx`] handles.
#[derive(Debug, Default)]
struct Store {
    /// All the tables, under a single lock.
    tables: RwLock<Tables>,

    /// Per-[`Car`] advisory locks.
    car_locks: StdMutex<HashMap<car::Id, Arc<AsyncMutex<()>>>>,
}

/// Plain table data of a [`Store`].
#[derive(Debug, Default)]
struct Tables {
    users: HashMap<user::Id, User>,
    cities: HashMap<city::Id, City>,
    companies: HashMap<car::company::Id, car::Company>,
    categories: HashMap<car::category::Id, car::Category>,
    models: HashMap<car::model::Id, car::Model>,
    cars: HashMap<car::Id, Car>,
    bookings: HashMap<booking::Id, Booking>,
    intents: HashMap<user::Id, RentalIntent>,
    maintenance: Vec<MaintenanceRecord>,
}

impl Tables {
    fn active_bookings(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.values().filter(|b| b.is_active())
    }

    fn car_is_free(&self, car_id: car::Id, period: &booking::Period) -> bool {
        !self.active_bookings().any(|b| {
            b.car_id == Some(car_id) && b.period.overlaps(period)
        })
    }

    fn entry(&self, entry_ref: catalog::EntryRef) -> Option<Entry> {
        match entry_ref {
            catalog::EntryRef::City(id) => {
                self.cities.get(&id).cloned().map(Entry::City)
            }
            catalog::EntryRef::CarCompany(id) => {
                self.companies.get(&id).cloned().map(Entry::CarCompany)
            }
            catalog::EntryRef::CarCategory(id) => {
                self.categories.get(&id).cloned().map(Entry::CarCategory)
            }
            catalog::EntryRef::CarModel(id) => {
                self.models.get(&id).cloned().map(Entry::CarModel)
            }
        }
    }

    fn put_entry(&mut self, entry: Entry) {
        match entry {
            Entry::City(c) => drop(self.cities.insert(c.id, c)),
            Entry::CarCompany(c) => drop(self.companies.insert(c.id, c)),
            Entry::CarCategory(c) => drop(self.categories.insert(c.id, c)),
            Entry::CarModel(m) => drop(self.models.insert(m.id, m)),
        }
    }

    fn delete_entry(&mut self, entry_ref: catalog::EntryRef) {
        match entry_ref {
            catalog::EntryRef::City(id) => {
                drop(self.cities.remove(&id));
                // Emulate `ON DELETE SET NULL` of the relational backend.
                for car in self.cars.values_mut() {
                    if car.city_id == Some(id) {
                        car.city_id = None;
                    }
                }
                for b in self.bookings.values_mut() {
                    if b.pickup_city_id == Some(id) {
                        b.pickup_city_id = None;
                    }
                    if b.delivery_city_id == Some(id) {
                        b.delivery_city_id = None;
                    }
                }
                self.intents.retain(|_, i| i.city_id != id);
            }
            catalog::EntryRef::CarCompany(id) => {
                drop(self.companies.remove(&id));
                for car in self.cars.values_mut() {
                    if car.company_id == Some(id) {
                        car.company_id = None;
                    }
                }
            }
            catalog::EntryRef::CarCategory(id) => {
                drop(self.categories.remove(&id));
                for car in self.cars.values_mut() {
                    if car.category_id == Some(id) {
                        car.category_id = None;
                    }
                }
            }
            catalog::EntryRef::CarModel(id) => {
                drop(self.models.remove(&id));
                for car in self.cars.values_mut() {
                    if car.model_id == Some(id) {
                        car.model_id = None;
                    }
                }
            }
        }
    }
}

impl Database<Transact> for InMemory {
    type Ok = Tx;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Tx {
            store: Arc::clone(&self.store),
            held: StdMutex::new(Vec::new()),
        })
    }
}

impl Database<Commit> for Tx {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.held.lock().unwrap().clear();
        Ok(())
    }
}

impl Database<Lock<By<Car, car::Id>>> for Tx {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Car, car::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let lock = {
            let mut locks = self.store.car_locks.lock().unwrap();
            Arc::clone(locks.entry(id).or_default())
        };
        let guard = lock.lock_owned().await;
        self.held.lock().unwrap().push(guard);
        Ok(())
    }
}

/// Stamps a [`Database`] operation impl for both [`InMemory`] and [`Tx`],
/// delegating to the provided closure over the locked [`Tables`].
macro_rules! impl_op {
    (
        <$lt:lifetime> $op:ty => $ok:ty,
        |$tables:ident, $arg:ident| $body:expr
    ) => {
        impl_op!(@stamp [<$lt>] $op => $ok, |$tables, $arg| $body);
    };
    (
        $op:ty => $ok:ty,
        |$tables:ident, $arg:ident| $body:expr
    ) => {
        impl_op!(@stamp [] $op => $ok, |$tables, $arg| $body);
    };
    (
        @stamp [$($generics:tt)*] $op:ty => $ok:ty,
        |$tables:ident, $arg:ident| $body:expr
    ) => {
        impl$($generics)* Database<$op> for InMemory {
            type Ok = $ok;
            type Err = Traced<database::Error>;

            async fn execute(&self, op: $op) -> Result<Self::Ok, Self::Err> {
                let mut guard = self.store.tables.write().unwrap();
                let $tables: &mut Tables = &mut guard;
                let $arg = op;
                let res = $body;
                Ok(res)
            }
        }

        impl$($generics)* Database<$op> for Tx {
            type Ok = $ok;
            type Err = Traced<database::Error>;

            async fn execute(&self, op: $op) -> Result<Self::Ok, Self::Err> {
                let mut guard = self.store.tables.write().unwrap();
                let $tables: &mut Tables = &mut guard;
                let $arg = op;
                let res = $body;
                Ok(res)
            }
        }
    };
}

impl_op!(Select<By<Option<User>, user::Id>> => Option<User>, |t, op| {
    t.users.get(&op.0.into_inner()).cloned()
});

impl_op!(
    <'l> Select<By<Option<User>, &'l user::Login>> => Option<User>,
    |t, op| {
        let login = op.0.into_inner();
        t.users.values().find(|u| &u.login == login).cloned()
    }
);

impl_op!(Insert<User> => (), |t, op| {
    let user = op.0;
    drop(t.users.insert(user.id, user));
});

impl_op!(Update<User> => (), |t, op| {
    let user = op.0;
    drop(t.users.insert(user.id, user));
});

impl_op!(Select<By<Option<City>, city::Id>> => Option<City>, |t, op| {
    t.cities.get(&op.0.into_inner()).cloned()
});

impl_op!(
    Select<By<Option<Entry>, catalog::EntryRef>> => Option<Entry>,
    |t, op| t.entry(op.0.into_inner())
);

impl_op!(
    Select<By<Option<Entry>, catalog::Lookup>> => Option<Entry>,
    |t, op| {
        let catalog::Lookup { kind, name } = op.0.into_inner();
        match kind {
            catalog::Kind::City => t
                .cities
                .values()
                .find(|c| c.name == name)
                .cloned()
                .map(Entry::City),
            catalog::Kind::CarCompany => t
                .companies
                .values()
                .find(|c| c.name == name)
                .cloned()
                .map(Entry::CarCompany),
            catalog::Kind::CarCategory => t
                .categories
                .values()
                .find(|c| c.name == name)
                .cloned()
                .map(Entry::CarCategory),
            catalog::Kind::CarModel => t
                .models
                .values()
                .find(|m| m.name == name)
                .cloned()
                .map(Entry::CarModel),
        }
    }
);

impl_op!(Insert<Entry> => (), |t, op| t.put_entry(op.0));

impl_op!(Update<Entry> => (), |t, op| t.put_entry(op.0));

impl_op!(Delete<catalog::EntryRef> => (), |t, op| t.delete_entry(op.0));

impl_op!(
    Select<By<read::catalog::InUse, catalog::EntryRef>>
        => read::catalog::InUse,
    |t, op| {
        read::catalog::InUse(match op.0.into_inner() {
            catalog::EntryRef::City(id) => {
                t.users.values().any(|u| u.city_id == Some(id))
            }
            catalog::EntryRef::CarCompany(id) => {
                t.cars.values().any(|c| c.company_id == Some(id))
            }
            catalog::EntryRef::CarCategory(id) => {
                t.cars.values().any(|c| c.category_id == Some(id))
            }
            catalog::EntryRef::CarModel(id) => {
                t.cars.values().any(|c| c.model_id == Some(id))
            }
        })
    }
);

impl_op!(Select<By<Vec<City>, ()>> => Vec<City>, |t, _op| {
    let mut all = t.cities.values().cloned().collect::<Vec<_>>();
    all.sort_by(|a, b| a.name.cmp(&b.name));
    all
});

impl_op!(Select<By<Vec<car::Company>, ()>> => Vec<car::Company>, |t, _op| {
    let mut all = t.companies.values().cloned().collect::<Vec<_>>();
    all.sort_by(|a, b| a.name.cmp(&b.name));
    all
});

impl_op!(Select<By<Vec<car::Category>, ()>> => Vec<car::Category>, |t, _op| {
    let mut all = t.categories.values().cloned().collect::<Vec<_>>();
    all.sort_by(|a, b| a.name.cmp(&b.name));
    all
});

impl_op!(
    Select<By<Vec<car::Model>, Option<car::company::Id>>> => Vec<car::Model>,
    |t, op| {
        let company_id = op.0.into_inner();
        let mut all = t
            .models
            .values()
            .filter(|m| company_id.is_none() || m.company_id == company_id)
            .cloned()
            .collect::<Vec<_>>();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
);

impl_op!(Select<By<Option<Car>, car::Id>> => Option<Car>, |t, op| {
    t.cars.get(&op.0.into_inner()).cloned()
});

impl_op!(
    <'p> Select<By<Option<Car>, &'p car::Plate>> => Option<Car>,
    |t, op| {
        let plate = op.0.into_inner();
        t.cars.values().find(|c| &c.plate == plate).cloned()
    }
);

impl_op!(Insert<Car> => (), |t, op| {
    let car = op.0;
    drop(t.cars.insert(car.id, car));
});

impl_op!(Update<Car> => (), |t, op| {
    let car = op.0;
    drop(t.cars.insert(car.id, car));
});

impl_op!(Delete<By<Car, car::Id>> => (), |t, op| {
    let id = op.0.into_inner();
    drop(t.cars.remove(&id));
    // Emulate `ON DELETE SET NULL` and `ON DELETE CASCADE`.
    for b in t.bookings.values_mut() {
        if b.car_id == Some(id) {
            b.car_id = None;
        }
    }
    t.maintenance.retain(|r| r.car_id != id);
});

impl_op!(Select<By<Option<Booking>, booking::Id>> => Option<Booking>, |t, op| {
    t.bookings.get(&op.0.into_inner()).cloned()
});

impl_op!(Select<By<Vec<Booking>, user::Id>> => Vec<Booking>, |t, op| {
    let user_id = op.0.into_inner();
    let mut all = t
        .bookings
        .values()
        .filter(|b| b.user_id == user_id)
        .cloned()
        .collect::<Vec<_>>();
    all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    all
});

impl_op!(
    Select<By<Vec<Booking>, read::booking::Schedule>> => Vec<Booking>,
    |t, op| {
        let read::booking::Schedule { city_id, kind, on } = op.0.into_inner();
        let mut all = t
            .active_bookings()
            .filter(|b| match kind {
                read::booking::ScheduleKind::Pickups => {
                    b.taken_at.is_none()
                        && b.period.from() == on
                        && b.pickup_city_id == Some(city_id)
                }
                read::booking::ScheduleKind::PickupsOverdue => {
                    b.taken_at.is_none()
                        && b.period.from() < on
                        && b.pickup_city_id == Some(city_id)
                }
                read::booking::ScheduleKind::Returns => {
                    b.taken_at.is_some()
                        && b.returned_at.is_none()
                        && b.period.till() == on
                        && b.delivery_city_id == Some(city_id)
                }
                read::booking::ScheduleKind::ReturnsOverdue => {
                    b.taken_at.is_some()
                        && b.returned_at.is_none()
                        && b.period.till() < on
                        && b.delivery_city_id == Some(city_id)
                }
            })
            .cloned()
            .collect::<Vec<_>>();
        all.sort_by_key(|b| (b.period.from(), Uuid::from(b.id)));
        all
    }
);

impl_op!(
    Select<By<read::booking::HasConflict, read::booking::CarConflict>>
        => read::booking::HasConflict,
    |t, op| {
        let read::booking::CarConflict { car_id, period } = op.0.into_inner();
        read::booking::HasConflict(!t.car_is_free(car_id, &period))
    }
);

impl_op!(
    Select<By<read::booking::HasConflict, read::booking::UserConflict>>
        => read::booking::HasConflict,
    |t, op| {
        let read::booking::UserConflict { user_id, period } =
            op.0.into_inner();
        read::booking::HasConflict(t.active_bookings().any(|b| {
            b.user_id == user_id && b.period.overlaps(&period)
        }))
    }
);

impl_op!(
    Select<By<read::booking::HasUpcoming, car::Id>>
        => read::booking::HasUpcoming,
    |t, op| {
        let car_id = op.0.into_inner();
        let today = Date::today();
        read::booking::HasUpcoming(t.active_bookings().any(|b| {
            b.car_id == Some(car_id) && b.period.from() >= today
        }))
    }
);

impl_op!(
    Select<By<read::user::HasUnsettledFine, user::Id>>
        => read::user::HasUnsettledFine,
    |t, op| {
        let user_id = op.0.into_inner();
        read::user::HasUnsettledFine(t.bookings.values().any(|b| {
            b.user_id == user_id && b.unsettled_fine().is_some()
        }))
    }
);

impl_op!(Insert<Booking> => (), |t, op| {
    let booking = op.0;
    drop(t.bookings.insert(booking.id, booking));
});

impl_op!(Update<Booking> => (), |t, op| {
    let booking = op.0;
    drop(t.bookings.insert(booking.id, booking));
});

impl_op!(
    Select<By<Option<RentalIntent>, user::Id>> => Option<RentalIntent>,
    |t, op| t.intents.get(&op.0.into_inner()).cloned()
);

impl_op!(Upsert<RentalIntent> => (), |t, op| {
    let intent = op.0;
    drop(t.intents.insert(intent.user_id, intent));
});

impl_op!(Delete<By<RentalIntent, Date>> => (), |t, op| {
    let today = op.0.into_inner();
    t.intents.retain(|_, i| i.period.from() >= today);
});

impl_op!(Insert<MaintenanceRecord> => (), |t, op| {
    t.maintenance.push(op.0);
});

impl_op!(
    Select<By<read::car::list::Page, read::car::list::Selector>>
        => read::car::list::Page,
    |t, op| {
        let read::car::list::Selector { arguments, filter } =
            op.0.into_inner();
        let read::car::list::Filter { city_id, period } = filter;

        let mut ids = t
            .cars
            .values()
            .filter(|c| c.is_available && c.city_id == Some(city_id))
            .filter(|c| t.car_is_free(c.id, &period))
            .map(|c| c.id)
            .collect::<Vec<_>>();
        ids.sort_by_key(|id| Uuid::from(*id));
        if arguments.kind().order() == common::pagination::Order::Descending {
            ids.reverse();
        }
        if let Some(cursor) = arguments.cursor() {
            let cursor = Uuid::from(*cursor);
            ids.retain(|id| {
                let id = Uuid::from(*id);
                match arguments.kind() {
                    Kind::Forward => id > cursor,
                    Kind::ForwardIncluding => id >= cursor,
                    Kind::Backward => id < cursor,
                    Kind::BackwardIncluding => id <= cursor,
                }
            });
        }

        let has_more = ids.len() > arguments.limit();
        let edges = ids
            .into_iter()
            .take(arguments.limit())
            .map(|id| (id, id))
            .collect::<Vec<_>>();
        read::car::list::Page::new(&arguments, edges, has_more)
    }
);

impl_op!(
    Select<By<read::car::list::TotalCount, read::car::list::Filter>>
        => read::car::list::TotalCount,
    |t, op| {
        let read::car::list::Filter { city_id, period } = op.0.into_inner();
        let count = t
            .cars
            .values()
            .filter(|c| c.is_available && c.city_id == Some(city_id))
            .filter(|c| t.car_is_free(c.id, &period))
            .count();
        read::car::list::TotalCount::from(
            i32::try_from(count).unwrap_or(i32::MAX),
        )
    }
);
