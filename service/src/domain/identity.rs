//! [`Identity`] definitions.

use crate::domain::{Session, User};

/// Resolved pairing of a valid [`Session`] with the [`User`] owning it.
///
/// Lives for a single request only and is never persisted.
#[derive(Clone, Debug)]
pub struct Identity {
    /// [`Session`] the request was authenticated with.
    pub session: Session,

    /// [`User`] the [`Session`] belongs to.
    pub user: User,
}
