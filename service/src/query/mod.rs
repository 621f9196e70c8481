//! [`Query`] definition.

pub mod health;
pub mod identity;

/// [`Query`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Query;
