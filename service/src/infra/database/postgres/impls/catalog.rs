//! Catalog-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{
        car,
        catalog::{self, Entry},
        City,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Select<By<Option<Entry>, catalog::Lookup>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Entry>, catalog::Lookup>>,
    ) -> Result<Self::Ok, Self::Err> {
        let catalog::Lookup { kind, name } = by.into_inner();

        let sql = match kind {
            catalog::Kind::City => {
                "SELECT id FROM cities WHERE name = $1::VARCHAR LIMIT 1"
            }
            catalog::Kind::CarCompany => {
                "SELECT id FROM car_companies WHERE name = $1::VARCHAR LIMIT 1"
            }
            catalog::Kind::CarCategory => {
                "SELECT id FROM car_categories WHERE name = $1::VARCHAR \
                 LIMIT 1"
            }
            catalog::Kind::CarModel => {
                "SELECT id FROM car_models WHERE name = $1::VARCHAR LIMIT 1"
            }
        };
        let Some(row) = self
            .query_opt(sql, &[&name])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let entry_ref = match kind {
            catalog::Kind::City => catalog::EntryRef::City(row.get("id")),
            catalog::Kind::CarCompany => {
                catalog::EntryRef::CarCompany(row.get("id"))
            }
            catalog::Kind::CarCategory => {
                catalog::EntryRef::CarCategory(row.get("id"))
            }
            catalog::Kind::CarModel => {
                catalog::EntryRef::CarModel(row.get("id"))
            }
        };
        self.execute(Select(By::<Option<Entry>, _>::new(entry_ref)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Option<Entry>, catalog::EntryRef>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Entry>, catalog::EntryRef>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let entry_ref: catalog::EntryRef = by.into_inner();

        Ok(match entry_ref {
            catalog::EntryRef::City(id) => {
                const SQL: &str = "\
                    SELECT id, name \
                    FROM cities \
                    WHERE id = $1::UUID \
                    LIMIT 1";
                self.query_opt(SQL, &[&id])
                    .await
                    .map_err(tracerr::wrap!())?
                    .map(|row| {
                        Entry::City(City {
                            id: row.get("id"),
                            name: row.get("name"),
                        })
                    })
            }
            catalog::EntryRef::CarCompany(id) => {
                const SQL: &str = "\
                    SELECT id, name \
                    FROM car_companies \
                    WHERE id = $1::UUID \
                    LIMIT 1";
                self.query_opt(SQL, &[&id])
                    .await
                    .map_err(tracerr::wrap!())?
                    .map(|row| {
                        Entry::CarCompany(car::Company {
                            id: row.get("id"),
                            name: row.get("name"),
                        })
                    })
            }
            catalog::EntryRef::CarCategory(id) => {
                const SQL: &str = "\
                    SELECT id, name \
                    FROM car_categories \
                    WHERE id = $1::UUID \
                    LIMIT 1";
                self.query_opt(SQL, &[&id])
                    .await
                    .map_err(tracerr::wrap!())?
                    .map(|row| {
                        Entry::CarCategory(car::Category {
                            id: row.get("id"),
                            name: row.get("name"),
                        })
                    })
            }
            catalog::EntryRef::CarModel(id) => {
                const SQL: &str = "\
                    SELECT id, name, company_id \
                    FROM car_models \
                    WHERE id = $1::UUID \
                    LIMIT 1";
                self.query_opt(SQL, &[&id])
                    .await
                    .map_err(tracerr::wrap!())?
                    .map(|row| {
                        Entry::CarModel(car::Model {
                            id: row.get("id"),
                            name: row.get("name"),
                            company_id: row.get("company_id"),
                        })
                    })
            }
        })
    }
}

impl<C> Database<Insert<Entry>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Entry>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<Entry>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(entry)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Entry>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(entry): Update<Entry>,
    ) -> Result<Self::Ok, Self::Err> {
        match entry {
            Entry::City(City { id, name }) => {
                const SQL: &str = "\
                    INSERT INTO cities (id, name) \
                    VALUES ($1::UUID, $2::VARCHAR) \
                    ON CONFLICT (id) DO UPDATE \
                    SET name = EXCLUDED.name";
                self.exec(SQL, &[&id, &name])
                    .await
                    .map_err(tracerr::wrap!())
                    .map(drop)
            }
            Entry::CarCompany(car::Company { id, name }) => {
                const SQL: &str = "\
                    INSERT INTO car_companies (id, name) \
                    VALUES ($1::UUID, $2::VARCHAR) \
                    ON CONFLICT (id) DO UPDATE \
                    SET name = EXCLUDED.name";
                self.exec(SQL, &[&id, &name])
                    .await
                    .map_err(tracerr::wrap!())
                    .map(drop)
            }
            Entry::CarCategory(car::Category { id, name }) => {
                const SQL: &str = "\
                    INSERT INTO car_categories (id, name) \
                    VALUES ($1::UUID, $2::VARCHAR) \
                    ON CONFLICT (id) DO UPDATE \
                    SET name = EXCLUDED.name";
                self.exec(SQL, &[&id, &name])
                    .await
                    .map_err(tracerr::wrap!())
                    .map(drop)
            }
            Entry::CarModel(car::Model {
                id,
                name,
                company_id,
            }) => {
                const SQL: &str = "\
                    INSERT INTO car_models (id, name, company_id) \
                    VALUES ($1::UUID, $2::VARCHAR, $3::UUID) \
                    ON CONFLICT (id) DO UPDATE \
                    SET name = EXCLUDED.name, \
                        company_id = EXCLUDED.company_id";
                self.exec(SQL, &[&id, &name, &company_id])
                    .await
                    .map_err(tracerr::wrap!())
                    .map(drop)
            }
        }
    }
}

impl<C> Database<Delete<catalog::EntryRef>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(entry_ref): Delete<catalog::EntryRef>,
    ) -> Result<Self::Ok, Self::Err> {
        match entry_ref {
            catalog::EntryRef::City(id) => {
                const SQL: &str = "DELETE FROM cities WHERE id = $1::UUID";
                self.exec(SQL, &[&id]).await
            }
            catalog::EntryRef::CarCompany(id) => {
                const SQL: &str = "\
                    DELETE FROM car_companies WHERE id = $1::UUID";
                self.exec(SQL, &[&id]).await
            }
            catalog::EntryRef::CarCategory(id) => {
                const SQL: &str = "\
                    DELETE FROM car_categories WHERE id = $1::UUID";
                self.exec(SQL, &[&id]).await
            }
            catalog::EntryRef::CarModel(id) => {
                const SQL: &str = "DELETE FROM car_models WHERE id = $1::UUID";
                self.exec(SQL, &[&id]).await
            }
        }
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<read::catalog::InUse, catalog::EntryRef>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::catalog::InUse;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::catalog::InUse, catalog::EntryRef>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let entry_ref: catalog::EntryRef = by.into_inner();

        let row = match entry_ref {
            // Only resident users pin a city: cars and bookings merely lose
            // their city reference on removal.
            catalog::EntryRef::City(id) => {
                const SQL: &str = "\
                    SELECT EXISTS(\
                        SELECT 1 FROM users WHERE city_id = $1::UUID\
                    ) AS exists";
                self.query_opt(SQL, &[&id]).await
            }
            catalog::EntryRef::CarCompany(id) => {
                const SQL: &str = "\
                    SELECT EXISTS(\
                        SELECT 1 FROM cars WHERE company_id = $1::UUID\
                    ) AS exists";
                self.query_opt(SQL, &[&id]).await
            }
            catalog::EntryRef::CarCategory(id) => {
                const SQL: &str = "\
                    SELECT EXISTS(\
                        SELECT 1 FROM cars WHERE category_id = $1::UUID\
                    ) AS exists";
                self.query_opt(SQL, &[&id]).await
            }
            catalog::EntryRef::CarModel(id) => {
                const SQL: &str = "\
                    SELECT EXISTS(\
                        SELECT 1 FROM cars WHERE model_id = $1::UUID\
                    ) AS exists";
                self.query_opt(SQL, &[&id]).await
            }
        }
        .map_err(tracerr::wrap!())?;

        Ok(read::catalog::InUse(
            row.expect("always exists").get("exists"),
        ))
    }
}

impl<C> Database<Select<By<Vec<City>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<City>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<City>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name \
            FROM cities \
            ORDER BY name";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| City {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }
}

impl<C> Database<Select<By<Vec<car::Company>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<car::Company>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<car::Company>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name \
            FROM car_companies \
            ORDER BY name";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| car::Company {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }
}

impl<C> Database<Select<By<Vec<car::Category>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<car::Category>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<car::Category>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, name \
            FROM car_categories \
            ORDER BY name";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| car::Category {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }
}

impl<C> Database<Select<By<Vec<car::Model>, Option<car::company::Id>>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<car::Model>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<car::Model>, Option<car::company::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let company_id: Option<car::company::Id> = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, company_id \
            FROM car_models \
            WHERE $1::UUID IS NULL OR company_id = $1::UUID \
            ORDER BY name";
        Ok(self
            .query(SQL, &[&company_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| car::Model {
                id: row.get("id"),
                name: row.get("name"),
                company_id: row.get("company_id"),
            })
            .collect())
    }
}
