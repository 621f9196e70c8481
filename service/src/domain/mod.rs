//! Domain definitions.

pub mod identity;
pub mod user;

pub use self::{
    identity::Identity,
    user::{Session, User},
};
