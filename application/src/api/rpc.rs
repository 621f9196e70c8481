//! RPC-style procedures of the `user` router, mounted under `/api/trpc`.

use axum::{routing::get, Json, Router};
use serde::Serialize;
use service::{
    domain::Identity,
    infra::database,
    query::identity::BySessionToken,
    Query,
};
use tracerr::Traced;

use crate::{
    api::{self, rest},
    AppState, Context, Service,
};

/// Builds the [`Router`] of RPC procedures.
pub fn router<Db>() -> Router<AppState<Db>>
where
    Db: Clone + Send + Sync + 'static,
    Service<Db>: Query<
        BySessionToken,
        Ok = Option<Identity>,
        Err = Traced<database::Error>,
    >,
{
    Router::new()
        .route("/user.me", get(me).fallback(rest::method_not_allowed))
        .route(
            "/user.session",
            get(current_session).fallback(rest::method_not_allowed),
        )
}

/// Result of the `user.me` procedure.
#[derive(Clone, Debug, Serialize)]
pub struct Me {
    /// Authenticated [`api::User`].
    pub user: api::User,
}

/// Result of the `user.session` procedure.
#[derive(Clone, Debug, Serialize)]
pub struct CurrentSession {
    /// [`api::Session`] the request is authenticated with.
    pub session: api::Session,

    /// [`api::User`] owning the [`api::Session`].
    pub user: api::User,
}

/// Returns the caller's own profile.
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
pub async fn me(ctx: Context) -> Json<Me> {
    Json(Me {
        user: (&ctx.identity().user).into(),
    })
}

/// Returns the caller's current session along with its owner.
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
pub async fn current_session(ctx: Context) -> Json<CurrentSession> {
    let Identity { session, user } = ctx.identity();
    Json(CurrentSession {
        session: session.into(),
        user: user.into(),
    })
}
