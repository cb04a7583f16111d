//! Storage traits and implementations.
//!
//! The `UserStore` trait defines the interface for user storage, allowing
//! different implementations behind the API.

pub mod user_store;

pub use user_store::{InMemoryUserStore, UserStore, UserStoreError};
