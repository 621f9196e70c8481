//! [`Query`] collection resolving an [`Identity`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::From;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{user::session, Identity},
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::Session;

use super::Query;

/// Resolves the [`Identity`] behind an active [`Session`] with the provided
/// [`session::Token`].
///
/// Unknown, expired and revoked [`Session`]s all resolve into [`None`], so a
/// caller can't tell them apart. Only a failure of the [`Database`] itself is
/// an error.
#[derive(Clone, Debug, From)]
pub struct BySessionToken {
    /// [`session::Token`] presented by a client.
    pub token: session::Token,
}

impl<Db> Query<BySessionToken> for Service<Db>
where
    Db: Database<
            Select<By<Option<Identity>, session::Token>>,
            Ok = Option<Identity>,
            Err = Traced<database::Error>,
        > + Sync,
{
    type Ok = Option<Identity>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        BySessionToken { token }: BySessionToken,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(identity) = self
            .database()
            .execute(Select(By::new(token)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            log::debug!("no `Session` matches the provided token");
            return Ok(None);
        };

        let session = &identity.session;
        if !session.is_active_at(DateTime::now()) {
            log::debug!(
                session.id = %session.id,
                session.revoked = session.revoked_at.is_some(),
                "`Session` is not active anymore",
            );
            return Ok(None);
        }

        Ok(Some(identity))
    }
}
