//! Data models for Loglink.

pub mod user;

pub use user::{User, UserCreate};
