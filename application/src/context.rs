//! [`Context`]-related definitions.

use axum::{async_trait, extract::FromRequestParts};
use axum_extra::headers::{
    authorization::Bearer, Authorization, Cookie, HeaderMapExt as _,
};
use derive_more::{Display, Error as StdError};
use service::{
    domain::{user::session, Identity},
    infra::database,
    query::identity::BySessionToken,
    Query,
};
use tracerr::Traced;

use crate::{define_error, AppState, AsError as _, Error, Service};

/// Per-request context handed over to API handlers.
///
/// The `I` parameter is the identity slot of this [`Context`]:
/// - `Context<Identity>` is demanded by protected handlers, so they run only
///   once the request is authenticated and never check it themselves;
/// - `Context<Option<Identity>>` serves public handlers willing to tell
///   anonymous callers from authenticated ones. None of the current public
///   routes does, so they declare no [`Context`] and skip resolution.
///
/// Extracting a `Context<Identity>` is the authorization gate of the API:
/// when no valid session stands behind the request, extraction is rejected
/// with [`AuthError::Unauthorized`] and the handler is not invoked at all.
#[derive(Debug)]
pub struct Context<I = Identity> {
    /// Identity slot of this [`Context`].
    identity: I,

    /// Parts of the HTTP request.
    parts: http::request::Parts,
}

impl<I> Context<I> {
    /// Returns parts of the HTTP request this [`Context`] is built for.
    ///
    /// Handlers reach the method, URI and headers through it, the identity
    /// having been resolved already.
    #[must_use]
    pub fn parts(&self) -> &http::request::Parts {
        &self.parts
    }
}

impl Context {
    /// Returns the [`Identity`] of the authenticated caller.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

impl Context<Option<Identity>> {
    /// Returns the [`Identity`] of the caller, if authenticated.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Turns this [`Context`] into an authenticated one.
    ///
    /// # Errors
    ///
    /// With [`Unauthenticated`] if no [`Identity`] is present.
    pub fn require(self) -> Result<Context, Unauthenticated> {
        let Self { identity, parts } = self;
        Ok(Context {
            identity: identity.ok_or(Unauthenticated)?,
            parts,
        })
    }

    /// Resolves the [`Identity`] behind the provided request `headers`.
    ///
    /// Requests without a session [`token()`] don't reach the [`Service`].
    ///
    /// # Errors
    ///
    /// If the [`Service`] fails to look the session up. A missing, unknown,
    /// expired or revoked session is not an error.
    pub async fn resolve<Db>(
        headers: &http::HeaderMap,
        state: &AppState<Db>,
    ) -> Result<Option<Identity>, Error>
    where
        Service<Db>: Query<
            BySessionToken,
            Ok = Option<Identity>,
            Err = Traced<database::Error>,
        >,
    {
        let Some(token) = token(headers, &state.session.cookie) else {
            return Ok(None);
        };
        state
            .service
            .execute(BySessionToken { token })
            .await
            .map_err(|e| e.into_error())
    }
}

/// Outcome of a [`Context`] lacking an [`Identity`] where one is required.
#[derive(Clone, Copy, Debug, Display, StdError)]
#[display("request is not authenticated")]
pub struct Unauthenticated;

impl From<Unauthenticated> for Error {
    fn from(_: Unauthenticated) -> Self {
        AuthError::Unauthorized.into()
    }
}

#[async_trait]
impl<Db> FromRequestParts<AppState<Db>> for Context<Option<Identity>>
where
    Db: Send + Sync,
    Service<Db>: Query<
        BySessionToken,
        Ok = Option<Identity>,
        Err = Traced<database::Error>,
    >,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        state: &AppState<Db>,
    ) -> Result<Self, Self::Rejection> {
        let identity = Self::resolve(&parts.headers, state).await?;
        Ok(Self {
            identity,
            parts: parts.clone(),
        })
    }
}

#[async_trait]
impl<Db> FromRequestParts<AppState<Db>> for Context
where
    Db: Send + Sync,
    Service<Db>: Query<
        BySessionToken,
        Ok = Option<Identity>,
        Err = Traced<database::Error>,
    >,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        state: &AppState<Db>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Context::<Option<Identity>>::from_request_parts(parts, state)
            .await?
            .require()?)
    }
}

/// Extracts a [`session::Token`] out of the provided request `headers`.
///
/// An `Authorization: Bearer <token>` header wins over the session `cookie`.
/// Headers of other shapes (another authorization scheme, empty token,
/// malformed value) count as absent.
#[must_use]
pub fn token(
    headers: &http::HeaderMap,
    cookie: &str,
) -> Option<session::Token> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().trim().to_owned())
        .filter(|t| !t.is_empty())
        .or_else(|| {
            headers
                .typed_get::<Cookie>()?
                .get(cookie)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(ToOwned::to_owned)
        })
        .map(session::Token::from)
}

define_error! {
    enum AuthError {
        #[code = "UNAUTHORIZED"]
        #[status = UNAUTHORIZED]
        #[message = "No valid session token found. Please send a valid \
                     Authorization header with Bearer token."]
        Unauthorized,
    }
}

#[cfg(test)]
mod spec {
    use std::{
        convert::Infallible,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    use axum::Json;
    use common::DateTime;
    use serde_json::{json, Value};
    use service::domain::Identity;

    use crate::{
        api,
        fixture::{self, Sessions},
    };

    use super::{token, Context};

    fn unauthorized() -> Value {
        json!({
            "success": false,
            "error": "Unauthorized",
            "message": "No valid session token found. Please send a valid \
                        Authorization header with Bearer token.",
        })
    }

    /// Calls a protected handler counting its invocations.
    async fn call_counted(
        sessions: &Sessions,
        calls: &Arc<AtomicUsize>,
        headers: &[(&str, &str)],
    ) -> (http::StatusCode, Value) {
        let calls = Arc::clone(calls);
        let handler = move |ctx: Context| async move {
            _ = calls.fetch_add(1, Ordering::SeqCst);
            Json(json!({ "user": api::User::from(&ctx.identity().user) }))
        };
        fixture::call(handler, sessions, headers).await
    }

    #[tokio::test]
    async fn rejects_request_without_token() {
        let sessions = Sessions::with(vec![fixture::identity("abc123", "u1")]);
        let calls = Arc::new(AtomicUsize::new(0));

        let (status, body) = call_counted(&sessions, &calls, &[]).await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
        assert_eq!(body, unauthorized());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(sessions.lookups(), 0);
    }

    #[tokio::test]
    async fn rejects_expired_session() {
        let mut expired = fixture::identity("abc123", "u1");
        expired.session.expires_at =
            (DateTime::now() - Duration::from_secs(1)).coerce();
        let sessions = Sessions::with(vec![expired]);
        let calls = Arc::new(AtomicUsize::new(0));

        let (status, body) =
            call_counted(&sessions, &calls, &[("Cookie", "session=abc123")])
                .await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
        assert_eq!(body, unauthorized());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejects_revoked_session() {
        let mut revoked = fixture::identity("abc123", "u1");
        revoked.session.revoked_at = Some(DateTime::now().coerce());
        let sessions = Sessions::with(vec![revoked]);
        let calls = Arc::new(AtomicUsize::new(0));

        let (status, body) = call_counted(
            &sessions,
            &calls,
            &[("Authorization", "Bearer abc123")],
        )
        .await;

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
        assert_eq!(body, unauthorized());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejects_unknown_token_as_missing_one() {
        let sessions = Sessions::with(vec![fixture::identity("abc123", "u1")]);
        let calls = Arc::new(AtomicUsize::new(0));

        let missing = call_counted(&sessions, &calls, &[]).await;
        let unknown =
            call_counted(&sessions, &calls, &[("Cookie", "session=zzz999")])
                .await;

        assert_eq!(unknown, missing);
        assert_eq!(unknown.0, http::StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(sessions.lookups(), 1);
    }

    #[tokio::test]
    async fn dispatches_valid_cookie_session_once() {
        let sessions = Sessions::with(vec![fixture::identity("abc123", "u1")]);
        let calls = Arc::new(AtomicUsize::new(0));

        let (status, body) =
            call_counted(&sessions, &calls, &[("Cookie", "session=abc123")])
                .await;

        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["user"]["id"], "u1");
        assert_eq!(body["user"]["email"], "a@example.com");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dispatches_valid_bearer_session_once() {
        let sessions = Sessions::with(vec![fixture::identity("abc123", "u1")]);
        let calls = Arc::new(AtomicUsize::new(0));

        let (status, body) = call_counted(
            &sessions,
            &calls,
            &[("authorization", "Bearer abc123")],
        )
        .await;

        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body["user"]["id"], "u1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dispatches_repeated_requests_independently() {
        let sessions = Sessions::with(vec![
            fixture::identity("abc123", "u1"),
            fixture::identity("def456", "u2"),
        ]);
        let calls = Arc::new(AtomicUsize::new(0));

        let first =
            call_counted(&sessions, &calls, &[("Cookie", "session=abc123")])
                .await;
        let other =
            call_counted(&sessions, &calls, &[("Cookie", "session=def456")])
                .await;
        let second =
            call_counted(&sessions, &calls, &[("Cookie", "session=abc123")])
                .await;

        assert_eq!(first, second);
        assert_eq!(first.1["user"]["id"], "u1");
        assert_eq!(other.1["user"]["id"], "u2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(sessions.lookups(), 3);
    }

    #[tokio::test]
    async fn fails_on_unreachable_store_without_dispatch() {
        let sessions = Sessions::unreachable();
        let calls = Arc::new(AtomicUsize::new(0));

        let (status, body) =
            call_counted(&sessions, &calls, &[("Cookie", "session=abc123")])
                .await;

        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], 500);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn public_context_tolerates_missing_identity() {
        let sessions = Sessions::with(vec![fixture::identity("abc123", "u1")]);
        let handler = |ctx: Context<Option<Identity>>| async move {
            Ok::<_, Infallible>(Json(json!({
                "authenticated": ctx.identity().is_some(),
            })))
        };

        let (_, anonymous) = fixture::call(handler, &sessions, &[]).await;
        let (_, known) = fixture::call(
            handler,
            &sessions,
            &[("Cookie", "session=abc123")],
        )
        .await;

        assert_eq!(anonymous, json!({ "authenticated": false }));
        assert_eq!(known, json!({ "authenticated": true }));
        assert_eq!(sessions.lookups(), 1);
    }

    #[tokio::test]
    async fn keeps_request_parts() {
        let sessions = Sessions::with(vec![fixture::identity("abc123", "u1")]);
        let handler = |ctx: Context| async move {
            let agent = ctx
                .parts()
                .headers
                .get(http::header::USER_AGENT)
                .and_then(|h| h.to_str().ok())
                .map(ToOwned::to_owned);
            Json(json!({
                "path": ctx.parts().uri.path(),
                "agent": agent,
            }))
        };

        let (status, body) = fixture::call(
            handler,
            &sessions,
            &[("Cookie", "session=abc123"), ("User-Agent", "Expo/1.0")],
        )
        .await;

        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(body, json!({ "path": "/", "agent": "Expo/1.0" }));
    }

    #[test]
    fn extracts_token_from_cookie() {
        let headers = fixture::headers(&[("Cookie", "theme=dark; session=abc")]);

        assert_eq!(
            token(&headers, "session").map(|t| t.expose().to_owned()),
            Some("abc".to_owned()),
        );
        assert!(token(&headers, "other").is_none());
    }

    #[test]
    fn prefers_bearer_over_cookie() {
        let headers = fixture::headers(&[
            ("Authorization", "Bearer from-header"),
            ("Cookie", "session=from-cookie"),
        ]);

        assert_eq!(
            token(&headers, "session").map(|t| t.expose().to_owned()),
            Some("from-header".to_owned()),
        );
    }

    #[test]
    fn ignores_other_authorization_schemes() {
        let basic = fixture::headers(&[("Authorization", "Basic dXNlcjpwYXNz")]);
        let empty = fixture::headers(&[("Authorization", "Bearer   ")]);
        let fallback = fixture::headers(&[
            ("Authorization", "Basic dXNlcjpwYXNz"),
            ("Cookie", "session=abc"),
        ]);

        assert!(token(&basic, "session").is_none());
        assert!(token(&empty, "session").is_none());
        assert_eq!(
            token(&fallback, "session").map(|t| t.expose().to_owned()),
            Some("abc".to_owned()),
        );
    }
}
