//! Talking to remote services, off the thread driving the map.

pub mod issuer;
pub(crate) mod runtime;

pub use issuer::{Error, HttpTokenIssuer, IssuerOptions};
