//! [`Query`] checking the [`Health`] of the [`Service`].

use std::convert::Infallible;

use common::operations::Perform;
use tracerr::Traced;
use tracing as log;

use crate::{
    infra::{
        database::{self, Ping},
        Database,
    },
    read::health::{Health, Status},
    Service,
};

use super::Query;

/// Checks the [`Health`] of the [`Service`] dependencies.
#[derive(Clone, Copy, Debug)]
pub struct Check;

impl<Db> Query<Check> for Service<Db>
where
    Db: Database<Perform<Ping>, Ok = (), Err = Traced<database::Error>> + Sync,
{
    type Ok = Health;
    type Err = Infallible;

    async fn execute(&self, _: Check) -> Result<Self::Ok, Self::Err> {
        let database = match self.database().execute(Perform(Ping)).await {
            Ok(()) => Status::Connected,
            Err(e) => {
                log::warn!("`Database` is unreachable: {e}");
                Status::Disconnected
            }
        };
        Ok(Health { database })
    }
}
