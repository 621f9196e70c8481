//! [`Health`] read model definition.

#[cfg(doc)]
use crate::infra::Database;

/// Current health of the [`Service`].
///
/// [`Service`]: crate::Service
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Health {
    /// [`Status`] of the [`Database`].
    pub database: Status,
}

impl Health {
    /// Indicates whether every dependency of the [`Service`] is operational.
    ///
    /// [`Service`]: crate::Service
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.database == Status::Connected
    }
}

/// Reachability status of a dependency.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    /// Dependency responds.
    Connected,

    /// Dependency doesn't respond.
    Disconnected,
}
