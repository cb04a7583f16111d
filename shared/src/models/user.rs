//! User data model.
//!
//! Defines the request and response shapes of the demo user resource.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payload for creating or replacing a user.
///
/// # Example
///
/// ```
/// use shared::models::UserCreate;
/// use shared::validator::Validate;
///
/// let user = UserCreate::new("Ada Lovelace", "ada@example.com").with_age(36);
/// assert!(user.validate().is_ok());
///
/// let nameless = UserCreate::new("", "nobody@example.com");
/// assert!(nameless.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserCreate {
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    /// Contact email. Stored as given.
    pub email: String,

    /// Age in years.
    #[serde(default)]
    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    pub age: Option<i32>,
}

impl UserCreate {
    /// Creates a payload without an age.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age: None,
        }
    }

    /// Sets the age.
    #[must_use]
    pub fn with_age(mut self, age: i32) -> Self {
        self.age = Some(age);
        self
    }
}

/// A stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier assigned by the store.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Age in years.
    pub age: Option<i32>,
}

impl User {
    /// Builds a stored user from its id and payload.
    #[must_use]
    pub fn from_create(id: u64, data: UserCreate) -> Self {
        Self {
            id,
            name: data.name,
            email: data.email,
            age: data.age,
        }
    }
}
