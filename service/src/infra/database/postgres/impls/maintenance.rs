//! [`MaintenanceRecord`]-related [`Database`] implementations.

use common::operations::Insert;
use tracerr::Traced;

use crate::{
    domain::MaintenanceRecord,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Insert<MaintenanceRecord>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(record): Insert<MaintenanceRecord>,
    ) -> Result<Self::Ok, Self::Err> {
        let MaintenanceRecord {
            id,
            car_id,
            admin_id,
            kind,
            description,
            created_at,
        } = record;

        const SQL: &str = "\
            INSERT INTO maintenance_records (\
                id, car_id, admin_id, kind, description, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::INT2, $5::VARCHAR, $6::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[&id, &car_id, &admin_id, &kind, &description, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
