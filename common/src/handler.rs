//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// Every layer of the workspace speaks through this trait: `Command`s and
/// `Query`s of a service, operations of a database, and so on. Returned
/// futures are [`Send`], so handlers may be driven by a multi-threaded
/// runtime.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>> + Send;
}
