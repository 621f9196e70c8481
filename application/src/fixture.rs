//! Helpers for testing API handlers without a real [`Postgres`].
//!
//! [`Postgres`]: service::infra::Postgres

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{body::Body, handler::Handler};
use common::{
    operations::{By, Perform, Select},
    DateTime,
};
use serde_json::Value;
use service::{
    domain::{user::session, Identity, Session, User},
    infra::{
        database::{self, Ping},
        postgres, Database,
    },
};
use tracerr::Traced;

use crate::{config, AppState, Service};

/// In-memory store of [`Identity`]s counting its lookups.
#[derive(Clone, Debug, Default)]
pub(crate) struct Sessions {
    identities: Arc<Vec<Identity>>,
    lookups: Arc<AtomicUsize>,
    unreachable: bool,
}

impl Sessions {
    pub(crate) fn with(identities: Vec<Identity>) -> Self {
        Self {
            identities: Arc::new(identities),
            ..Self::default()
        }
    }

    pub(crate) fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), Traced<database::Error>> {
        if self.unreachable {
            return Err(tracerr::new!(database::Error::from(
                postgres::Error::PoolError(
                    postgres::connection::PoolError::Closed,
                ),
            )));
        }
        Ok(())
    }
}

impl Database<Select<By<Option<Identity>, session::Token>>> for Sessions {
    type Ok = Option<Identity>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Identity>, session::Token>>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let token = by.into_inner();
        Ok(self
            .identities
            .iter()
            .find(|i| i.session.token == token)
            .cloned())
    }
}

impl Database<Perform<Ping>> for Sessions {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Perform<Ping>) -> Result<(), Self::Err> {
        self.check()
    }
}

/// Creates an active [`Identity`] of a [`User`] with the provided `user_id`,
/// behind the provided session `token`.
pub(crate) fn identity(token: &str, user_id: &str) -> Identity {
    let now = DateTime::now();
    Identity {
        session: Session {
            id: format!("session-{token}").into(),
            token: token.into(),
            user_id: user_id.into(),
            created_at: (now - Duration::from_secs(60)).coerce(),
            expires_at: (now + Duration::from_secs(3600)).coerce(),
            revoked_at: None,
            ip_address: Some("127.0.0.1".into()),
            user_agent: Some("Expo/1.0".into()),
        },
        user: User {
            id: user_id.into(),
            name: "Alice".into(),
            email: "a@example.com".into(),
            email_verified: true,
            image: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        },
    }
}

pub(crate) fn state(sessions: &Sessions) -> AppState<Sessions> {
    AppState {
        service: Service::new(sessions.clone()),
        session: config::Session::default(),
    }
}

pub(crate) fn headers(pairs: &[(&str, &str)]) -> http::HeaderMap {
    let mut headers = http::HeaderMap::new();
    for (name, value) in pairs {
        _ = headers.append(
            http::HeaderName::try_from(*name).unwrap(),
            http::HeaderValue::from_str(value).unwrap(),
        );
    }
    headers
}

/// Calls the provided `handler` with a `GET /` request carrying `headers`,
/// returning the response status and its JSON body.
pub(crate) async fn call<H, T>(
    handler: H,
    sessions: &Sessions,
    headers: &[(&str, &str)],
) -> (http::StatusCode, Value)
where
    H: Handler<T, AppState<Sessions>>,
    T: 'static,
{
    let mut request = http::Request::builder().uri("/");
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let response = handler
        .call(request.body(Body::empty()).unwrap(), state(sessions))
        .await;

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
