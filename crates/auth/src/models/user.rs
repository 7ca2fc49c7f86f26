//! User domain types.

use serde::{Deserialize, Serialize};

use autorithm_core::{Email, ProductId, UserId};

/// A persisted user record.
///
/// Stored as JSON in the user collection. The password is held in plaintext
/// and compared by string equality; this is a known weakness carried over
/// from the system this layer replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Time-based external identifier.
    pub id: UserId,
    /// Unique email address.
    pub email: Email,
    /// Plaintext password.
    pub password: String,
    /// Display name.
    pub name: String,
    /// Purchased product entitlements. Records written before entitlements
    /// existed omit the field entirely.
    #[serde(default)]
    pub purchased_products: Vec<ProductId>,
}

/// The client-facing session projection of a [`User`].
///
/// Everything the UI needs and nothing it must not see - in particular, no
/// password. Replaced wholesale on each login; destroyed on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    /// User's external identifier.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Purchased product entitlements.
    #[serde(default)]
    pub purchased_products: Vec<ProductId>,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            purchased_products: user.purchased_products.clone(),
        }
    }
}
