//! Postgres [`Database`] implementation.

pub mod connection;
mod impls;

use std::time::Duration;

use common::operations::Perform;
use deadpool_postgres::Runtime;
use derive_more::{Display, Error as StdError, From};
use tokio_postgres::NoTls;
use tracerr::Traced;
use tracing as log;

use crate::infra::database::{self, Database, Ping};

pub use refinery::embed_migrations;

pub use self::connection::Connection;

pub use deadpool_postgres::{Config, PoolConfig};

/// Postgres [`Database`] client.
///
/// Cheap to clone: all the clones share the same [`connection::Pool`], which
/// is released by [`Postgres::close()`].
#[derive(Clone, Debug)]
pub struct Postgres {
    /// [`connection::Pool`] to take [`Connection`]s from.
    pool: connection::Pool,
}

impl Postgres {
    /// Creates a new [`Postgres`] client with the provided [`Config`].
    ///
    /// No connection is established yet, see [`Postgres::wait_ready()`].
    ///
    /// # Errors
    ///
    /// If failed to create a new [`Postgres`] client.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self { pool })
    }

    /// Waits until this [`Postgres`] database becomes reachable.
    ///
    /// Makes up to `retries` additional attempts after a failed one, doubling
    /// the `delay` between them each time.
    ///
    /// # Errors
    ///
    /// With the last failure, if the database is still unreachable after all
    /// the attempts.
    pub async fn wait_ready(
        &self,
        retries: u32,
        delay: Duration,
    ) -> Result<(), Traced<database::Error>> {
        let mut attempt = 0;
        loop {
            match self.execute(Perform(Ping)).await {
                Ok(()) => {
                    log::info!("`Postgres` database is reachable");
                    return Ok(());
                }
                Err(e) if attempt < retries => {
                    attempt += 1;
                    let backoff =
                        delay.saturating_mul(2_u32.saturating_pow(attempt - 1));
                    log::warn!(
                        "`Postgres` database is unreachable, retrying \
                         ({attempt}/{retries}) in {}ms: {e}",
                        backoff.as_millis(),
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(tracerr::new!(e)),
            }
        }
    }

    /// Closes the underlying [`connection::Pool`] of this [`Postgres`] client.
    ///
    /// Any further operation on this [`Postgres`] client (or its clones)
    /// fails.
    pub fn close(&self) {
        self.pool.close();
        log::info!("`Postgres` connection pool closed");
    }

    /// Takes a [`Connection`] from the [`connection::Pool`].
    ///
    /// # Errors
    ///
    /// If the [`connection::Pool`] fails to provide a [`Connection`].
    async fn connection(
        &self,
    ) -> Result<connection::Client, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// [`Connection`] error.
    #[display("`Connection` error: {_0}")]
    Connection(connection::Error),

    /// Error of creating a new [`connection::Pool`] client.
    #[display("Failed to create a new `connection::Pool`: {_0}")]
    PoolCreationError(connection::PoolCreationError),

    /// [`connection::Pool`] error.
    #[display("`connection::Pool` error: {_0}")]
    PoolError(connection::PoolError),
}
