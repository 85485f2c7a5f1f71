//! Client for the TaleWeaver story service: an HTTP gateway to the API, a
//! session holding the signed-in identity, and the state behind the create,
//! dashboard and explore views.

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod nav;
pub mod notify;
pub mod response;
pub mod tales;

#[cfg(test)]
pub(crate) mod testing;

pub use context::AppContext;
pub use error::{ApiError, TaleError};
