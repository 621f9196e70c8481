//! Plain REST endpoints.

use std::convert::Infallible;

use axum::{extract::State, Json};
use serde::Serialize;
use service::{
    query::health,
    read::health::{Health, Status},
    Query,
};

use crate::{
    api::{self, envelope::Success},
    define_error, AppState, Context, Error, Service,
};

/// Description of the API served at its root.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Index {
    /// Name of the API.
    pub message: &'static str,

    /// Version of the API.
    pub version: &'static str,

    /// Index of the API [`Endpoints`].
    pub endpoints: Endpoints,
}

/// Index of the API endpoints.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Endpoints {
    /// Health check.
    pub health: &'static str,

    /// Session verification of the mobile application.
    pub user: &'static str,

    /// RPC procedures.
    pub rpc: &'static str,
}

/// Describes the API.
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
pub async fn index() -> Success<Index> {
    Success::new(Index {
        message: "API Server",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            health: "/api/health",
            user: "/api/user/secure-endpoint",
            rpc: "/api/trpc",
        },
    })
}

/// Result of the health check.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct HealthCheck {
    /// Overall status: `ok` or `degraded`.
    pub status: &'static str,

    /// Database status: `connected` or `disconnected`.
    pub database: &'static str,
}

impl From<Health> for HealthCheck {
    fn from(health: Health) -> Self {
        Self {
            status: if health.is_ok() { "ok" } else { "degraded" },
            database: match health.database {
                Status::Connected => "connected",
                Status::Disconnected => "disconnected",
            },
        }
    }
}

/// Reports whether the server and its database are operational.
///
/// Responds with `503 Service Unavailable` once degraded.
pub async fn health<Db>(
    State(state): State<AppState<Db>>,
) -> (http::StatusCode, Json<HealthCheck>)
where
    Service<Db>: Query<health::Check, Ok = Health, Err = Infallible>,
{
    let health = state
        .service
        .execute(health::Check)
        .await
        .unwrap_or_else(|e| match e {});

    let status = if health.is_ok() {
        http::StatusCode::OK
    } else {
        http::StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health.into()))
}

/// Result of a successful session verification.
#[derive(Clone, Debug, Serialize)]
pub struct Verified {
    /// Human-readable confirmation.
    pub message: &'static str,

    /// Authenticated [`api::User`].
    pub user: api::User,
}

/// Verifies the session of the mobile application.
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
pub async fn secure_endpoint(ctx: Context) -> Success<Verified> {
    Success::new(Verified {
        message: "User synced successfully",
        user: (&ctx.identity().user).into(),
    })
}

/// Answers requests to unknown routes.
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
pub async fn not_found() -> Error {
    RouteError::NotFound.into()
}

/// Answers requests to known routes with an unsupported method.
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
pub async fn method_not_allowed() -> Error {
    RouteError::MethodNotAllowed.into()
}

define_error! {
    enum RouteError {
        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "The requested resource was not found"]
        NotFound,

        #[code = "METHOD_NOT_ALLOWED"]
        #[status = METHOD_NOT_ALLOWED]
        #[message = "The requested method is not supported by the resource"]
        MethodNotAllowed,
    }
}

#[cfg(test)]
mod spec {
    use serde_json::json;

    use crate::fixture::{self, Sessions};

    use super::{
        health, index, method_not_allowed, not_found, secure_endpoint,
    };

    #[tokio::test]
    async fn describes_api() {
        let (status, body) =
            fixture::call(index, &Sessions::default(), &[]).await;

        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["message"], "API Server");
        assert_eq!(body["data"]["endpoints"]["health"], "/api/health");
    }

    #[tokio::test]
    async fn reports_healthy_database() {
        let sessions = Sessions::default();

        let (status, body) =
            fixture::call(health::<Sessions>, &sessions, &[]).await;

        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "database": "connected" }));
    }

    #[tokio::test]
    async fn reports_degraded_database() {
        let sessions = Sessions::unreachable();

        let (status, body) =
            fixture::call(health::<Sessions>, &sessions, &[]).await;

        assert_eq!(status, http::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body,
            json!({ "status": "degraded", "database": "disconnected" }),
        );
    }

    #[tokio::test]
    async fn verifies_session() {
        let sessions = Sessions::with(vec![fixture::identity("abc123", "u1")]);

        let (status, body) = fixture::call(
            secure_endpoint,
            &sessions,
            &[("Authorization", "Bearer abc123")],
        )
        .await;

        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "success": true,
                "data": {
                    "message": "User synced successfully",
                    "user": {
                        "id": "u1",
                        "email": "a@example.com",
                        "emailVerified": true,
                        "name": "Alice",
                        "image": null,
                    },
                },
            }),
        );
    }

    #[tokio::test]
    async fn rejects_unverified_session() {
        let sessions = Sessions::with(vec![fixture::identity("abc123", "u1")]);

        let (status, body) = fixture::call(
            secure_endpoint,
            &sessions,
            &[("Authorization", "Bearer nope")],
        )
        .await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn answers_unknown_route() {
        let (status, body) =
            fixture::call(not_found, &Sessions::default(), &[]).await;

        assert_eq!(status, http::StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": {
                    "code": 404,
                    "message": "Not Found",
                    "description": "The requested resource was not found",
                },
            }),
        );
    }

    #[tokio::test]
    async fn answers_unsupported_method() {
        let (status, body) =
            fixture::call(method_not_allowed, &Sessions::default(), &[]).await;

        assert_eq!(status, http::StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], 405);
        assert_eq!(body["error"]["message"], "Method Not Allowed");
    }
}
