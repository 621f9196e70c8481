//! [`User`] and [`Session`] representations of the API.

use common::datetime;
use serde::Serialize;
use service::domain::{self, user::session};

/// Public profile of an authenticated [`domain::User`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// ID of the [`domain::User`].
    pub id: String,

    /// Email of the [`domain::User`].
    pub email: String,

    /// Indicator whether the email has been verified.
    pub email_verified: bool,

    /// Display name of the [`domain::User`].
    pub name: String,

    /// Avatar URL of the [`domain::User`], rendered as `null` if absent.
    pub image: Option<String>,
}

impl From<&domain::User> for User {
    fn from(user: &domain::User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.to_string(),
            email_verified: user.email_verified,
            name: user.name.to_string(),
            image: user.image.as_ref().map(ToString::to_string),
        }
    }
}

/// [`domain::Session`] as seen by its owner.
///
/// Never carries the session token.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// ID of the [`domain::Session`].
    pub id: String,

    /// ID of the [`domain::User`] owning the [`domain::Session`].
    pub user_id: String,

    /// Moment the [`domain::Session`] was created at.
    #[serde(with = "datetime::serde::rfc3339")]
    pub created_at: session::CreationDateTime,

    /// Moment the [`domain::Session`] expires at.
    #[serde(with = "datetime::serde::rfc3339")]
    pub expires_at: session::ExpirationDateTime,

    /// Address the [`domain::Session`] was opened from, if known.
    pub ip_address: Option<String>,

    /// `User-Agent` the [`domain::Session`] was opened with, if known.
    pub user_agent: Option<String>,
}

impl From<&domain::Session> for Session {
    fn from(session: &domain::Session) -> Self {
        Self {
            id: session.id.to_string(),
            user_id: session.user_id.to_string(),
            created_at: session.created_at,
            expires_at: session.expires_at,
            ip_address: session.ip_address.as_ref().map(ToString::to_string),
            user_agent: session.user_agent.as_ref().map(ToString::to_string),
        }
    }
}
