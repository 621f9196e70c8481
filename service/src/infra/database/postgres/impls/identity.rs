//! [`Identity`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session},
        Identity, Session, User,
    },
    infra::{
        database::{self, postgres::Connection as _, Postgres},
        Database,
    },
};

impl Database<Select<By<Option<Identity>, session::Token>>> for Postgres {
    type Ok = Option<Identity>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Identity>, session::Token>>,
    ) -> Result<Self::Ok, Self::Err> {
        let token = by.into_inner();

        const SQL: &str = "\
            SELECT s.id AS session_id, s.user_id, \
                   s.created_at AS session_created_at, \
                   s.expires_at, s.revoked_at, \
                   s.ip_address, s.user_agent, \
                   u.name, u.email, u.email_verified, u.image, \
                   u.created_at AS user_created_at, \
                   u.updated_at AS user_updated_at \
            FROM sessions AS s \
            INNER JOIN users AS u ON u.id = s.user_id \
            WHERE s.token = $1::TEXT \
            LIMIT 1";
        let row = self
            .connection()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(SQL, &[&token.expose()])
            .await
            .map_err(tracerr::wrap!())?;

        Ok(row.map(|row| {
            let user_id: user::Id = row.get("user_id");
            Identity {
                session: Session {
                    id: row.get("session_id"),
                    token,
                    user_id: user_id.clone(),
                    created_at: row.get("session_created_at"),
                    expires_at: row.get("expires_at"),
                    revoked_at: row.get("revoked_at"),
                    ip_address: row.get("ip_address"),
                    user_agent: row.get("user_agent"),
                },
                user: User {
                    id: user_id,
                    name: row.get("name"),
                    email: row.get("email"),
                    email_verified: row.get("email_verified"),
                    image: row.get("image"),
                    created_at: row.get("user_created_at"),
                    updated_at: row.get("user_updated_at"),
                },
            }
        }))
    }
}
