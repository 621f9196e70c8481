//! HTTP API definitions.

pub mod envelope;
pub mod rest;
pub mod rpc;
pub mod user;

use std::convert::Infallible;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderValue, InvalidHeaderValue};
use service::{
    domain::Identity, infra::database, query, read::health::Health, Query,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracerr::Traced;

use crate::{
    config::{self, Environment},
    error, AppState, Service,
};

pub use self::user::{Session, User};

/// Builds the [`Router`] serving the whole API.
///
/// Unknown routes are answered with a `404 Not Found` [`envelope::Failure`],
/// and unsupported methods of known routes with a `405 Method Not Allowed`
/// one.
/// Internal failures are redacted when running in the
/// [`Environment::Production`].
pub fn router<Db>(state: AppState<Db>, environment: Environment) -> Router
where
    Db: Clone + Send + Sync + 'static,
    Service<Db>: Query<
            query::identity::BySessionToken,
            Ok = Option<Identity>,
            Err = Traced<database::Error>,
        > + Query<query::health::Check, Ok = Health, Err = Infallible>,
{
    Router::new()
        .route("/", get(rest::index).fallback(rest::method_not_allowed))
        .route(
            "/api/health",
            get(rest::health::<Db>).fallback(rest::method_not_allowed),
        )
        .route(
            "/api/user/secure-endpoint",
            get(rest::secure_endpoint).fallback(rest::method_not_allowed),
        )
        .nest("/api/trpc", rpc::router())
        .fallback(rest::not_found)
        .with_state(state)
        .layer(middleware::from_fn_with_state(environment, error::redact))
}

/// Builds the [`CorsLayer`] allowing every configured origin.
///
/// A `*` among the origins allows any origin.
///
/// # Errors
///
/// If any of the origins is not a valid header value.
pub fn cors(conf: &config::Cors) -> Result<CorsLayer, InvalidHeaderValue> {
    let origins = if conf.origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            conf.origins
                .iter()
                .map(|o| o.parse::<HeaderValue>())
                .collect::<Result<Vec<_>, _>>()?,
        )
    };
    Ok(CorsLayer::new()
        .allow_methods([http::Method::GET, http::Method::OPTIONS])
        .allow_headers([
            http::header::AUTHORIZATION,
            http::header::CONTENT_TYPE,
        ])
        .allow_origin(origins))
}
