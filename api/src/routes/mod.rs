//! API route definitions.
//!
//! This module organizes all HTTP routes for the Loglink API server.

mod health;
mod root;
mod users;

pub use health::health_routes;
pub use root::root_routes;
pub use users::{users_routes, ErrorResponse};
