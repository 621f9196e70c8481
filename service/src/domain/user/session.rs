//! [`Session`] definitions.

use common::{unit, DateTime, DateTimeOf};
use derive_more::{AsRef, Debug, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use secrecy::{ExposeSecret as _, SecretString};

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// Single authenticated login of a [`User`].
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of this [`Session`].
    pub id: Id,

    /// [`Token`] presented by the client to prove this [`Session`].
    pub token: Token,

    /// ID of the [`User`] this [`Session`] belongs to.
    pub user_id: user::Id,

    /// [`DateTime`] when this [`Session`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: ExpirationDateTime,

    /// [`DateTime`] when this [`Session`] was revoked, if it was.
    pub revoked_at: Option<RevocationDateTime>,

    /// [`IpAddress`] this [`Session`] was opened from, if known.
    pub ip_address: Option<IpAddress>,

    /// [`UserAgent`] this [`Session`] was opened with, if known.
    pub user_agent: Option<UserAgent>,
}

impl Session {
    /// Checks whether this [`Session`] is usable at the provided moment.
    ///
    /// A [`Session`] is active only strictly before its expiration and only
    /// while it hasn't been revoked.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime) -> bool {
        self.revoked_at.is_none() && now.is_before(&self.expires_at)
    }
}

/// ID of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, Into, PartialEq)]
#[as_ref(str, String)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Id(String);

/// Opaque access token of a [`Session`].
///
/// Its value never appears in [`Debug`] output.
#[derive(Clone, Debug)]
#[debug("Token(..)")]
pub struct Token(SecretString);

impl Token {
    /// Exposes the raw value of this [`Token`].
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for Token {
    fn from(token: String) -> Self {
        Self(token.into())
    }
}

impl From<&str> for Token {
    fn from(token: &str) -> Self {
        Self(token.into())
    }
}

impl Eq for Token {}
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

/// Network address of the client a [`Session`] was opened from.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Into, PartialEq)]
#[as_ref(str, String)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct IpAddress(String);

/// `User-Agent` of the client a [`Session`] was opened with.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Into, PartialEq)]
#[as_ref(str, String)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct UserAgent(String);

/// [`DateTime`] when a [`Session`] was created.
pub type CreationDateTime = DateTimeOf<(Session, unit::Creation)>;

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

/// [`DateTime`] of a [`Session`] revocation.
pub type RevocationDateTime = DateTimeOf<(Session, unit::Revocation)>;
