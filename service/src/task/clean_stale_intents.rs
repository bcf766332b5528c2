//! [`CleanStaleIntents`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::{
    operations::{By, Delete, Perform, Start},
    Date,
};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::RentalIntent,
    infra::{database, Database},
    Service,
};

use super::Task;

/// Configuration for [`CleanStaleIntents`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between [`RentalIntent`]s sweeping.
    pub interval: time::Duration,
}

/// [`Task`] for sweeping stale [`RentalIntent`]s.
///
/// A [`RentalIntent`] turns stale once its requested period can no longer
/// start: the first requested day is already in the past.
#[derive(Clone, Copy, Debug)]
pub struct CleanStaleIntents<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<CleanStaleIntents<Self>, Config>>> for Service<Db>
where
    CleanStaleIntents<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<CleanStaleIntents<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = CleanStaleIntents {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::CleanStaleIntents` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for CleanStaleIntents<Service<Db>>
where
    Db: Database<
        Delete<By<RentalIntent, Date>>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        self.service
            .database()
            .execute(Delete(By::new(Date::today())))
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}

/// Error of [`CleanStaleIntents`] execution.
pub type ExecutionError = Traced<database::Error>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::operations::{By, Insert, Perform, Select, Upsert};

    use crate::{
        command::SubmitRentalIntent, domain::RentalIntent, fixture,
        infra::Database as _, Command as _, Task as _,
    };

    use super::{CleanStaleIntents, Config};

    #[tokio::test]
    async fn sweeps_only_stale_intents() {
        let (svc, renter, car) = fixture::rental_setup().await;
        let other = fixture::customer(None);
        svc.database().execute(Insert(other.clone())).await.unwrap();
        let city_id = car.city_id.unwrap();

        let fresh = svc
            .execute(SubmitRentalIntent {
                initiator_id: renter.id,
                period: fixture::period_in(1, 3),
                city_id,
            })
            .await
            .unwrap();
        let stale = RentalIntent {
            user_id: other.id,
            period: fixture::period_in(-3, -1),
            ..fresh.clone()
        };
        svc.database().execute(Upsert(stale)).await.unwrap();

        let task = CleanStaleIntents {
            config: Config {
                interval: Duration::from_secs(60 * 60),
            },
            service: svc.clone(),
        };
        task.execute(Perform(())).await.unwrap();

        let kept = svc
            .database()
            .execute(Select(By::<Option<RentalIntent>, _>::new(renter.id)))
            .await
            .unwrap();
        assert!(kept.is_some());
        let swept = svc
            .database()
            .execute(Select(By::<Option<RentalIntent>, _>::new(other.id)))
            .await
            .unwrap();
        assert!(swept.is_none());
    }
}
