//! Read entities definitions.

pub mod health;
