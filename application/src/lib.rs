//! Application provides HTTP API authorizing requests of the mobile client
//! against the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
pub mod context;
pub mod error;
#[cfg(test)]
mod fixture;

// Used in binary.
use axum_client_ip as _;
use refinery as _;
use tokio as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::Context,
    error::{AsError, Error},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service<Db = service::infra::Postgres> = service::Service<Db>;

/// State shared by every API handler.
#[derive(Clone, Debug)]
pub struct AppState<Db = service::infra::Postgres> {
    /// [`Service`] resolving identities behind requests.
    pub service: Service<Db>,

    /// Session transport configuration.
    pub session: config::Session,
}
