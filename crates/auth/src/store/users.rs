//! User collection operations.
//!
//! Collection-level access to the registered users stored under the
//! `autorithm_users` key. Every operation reads the full collection, works on
//! it in memory, and writes it back whole; there are no partial updates and
//! no transactions.

use autorithm_core::Email;

use super::{LocalStore, StoreError, keys};
use crate::models::User;

/// Repository over the stored user collection.
pub struct UserStore<'a> {
    store: &'a LocalStore,
}

impl<'a> UserStore<'a> {
    /// Create a new user store over a local store.
    #[must_use]
    pub const fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    /// Find a user by email address (plain string equality).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the store cannot be read, or
    /// `StoreError::DataCorruption` if the collection cannot be decoded.
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.load()?;
        Ok(users.into_iter().find(|u| u.email.as_str() == email))
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if a user with the same email already
    /// exists, or `StoreError::Io`/`StoreError::DataCorruption` on store
    /// failures.
    pub fn create(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.load()?;

        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }

        users.push(user.clone());
        self.save(&users)?;

        Ok(user)
    }

    /// Overwrite the stored password for the user with the given email.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no user matches the email, or
    /// `StoreError::Io`/`StoreError::DataCorruption` on store failures.
    pub fn update_password(&self, email: &Email, new_password: &str) -> Result<(), StoreError> {
        let mut users = self.load()?;

        let user = users
            .iter_mut()
            .find(|u| u.email == *email)
            .ok_or(StoreError::NotFound)?;
        user.password = new_password.to_owned();

        self.save(&users)
    }

    /// Load the full user collection. A missing key is an empty collection.
    fn load(&self) -> Result<Vec<User>, StoreError> {
        match self.store.get(keys::USERS)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| StoreError::DataCorruption(format!("invalid user collection: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    /// Write the full user collection back.
    fn save(&self, users: &[User]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(users)
            .map_err(|e| StoreError::DataCorruption(format!("failed to encode users: {e}")))?;
        self.store.set(keys::USERS, &raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use autorithm_core::UserId;

    use super::*;

    fn temp_store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("store.json"));
        (dir, store)
    }

    fn user(email: &str, password: &str) -> User {
        User {
            id: UserId::generate(),
            email: Email::parse(email).unwrap(),
            password: password.to_owned(),
            name: "Test User".to_owned(),
            purchased_products: Vec::new(),
        }
    }

    #[test]
    fn test_get_by_email_on_empty_store() {
        let (_dir, store) = temp_store();
        let users = UserStore::new(&store);

        assert!(users.get_by_email("a@x.com").unwrap().is_none());
    }

    #[test]
    fn test_create_and_find() {
        let (_dir, store) = temp_store();
        let users = UserStore::new(&store);

        users.create(user("a@x.com", "pw1")).unwrap();

        let found = users.get_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(found.email.as_str(), "a@x.com");
        assert_eq!(found.password, "pw1");
    }

    #[test]
    fn test_create_duplicate_email_conflicts() {
        let (_dir, store) = temp_store();
        let users = UserStore::new(&store);

        users.create(user("a@x.com", "pw1")).unwrap();
        let err = users.create(user("a@x.com", "other")).unwrap_err();

        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_update_password() {
        let (_dir, store) = temp_store();
        let users = UserStore::new(&store);

        users.create(user("a@x.com", "old")).unwrap();
        users
            .update_password(&Email::parse("a@x.com").unwrap(), "new")
            .unwrap();

        let found = users.get_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(found.password, "new");
    }

    #[test]
    fn test_update_password_missing_user() {
        let (_dir, store) = temp_store();
        let users = UserStore::new(&store);

        let err = users
            .update_password(&Email::parse("a@x.com").unwrap(), "new")
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn test_missing_purchased_products_defaults_empty() {
        let (_dir, store) = temp_store();

        // A record written before entitlements existed has no
        // purchasedProducts field at all.
        store
            .set(
                keys::USERS,
                r#"[{"id":"1700000000000","email":"a@x.com","password":"pw1","name":"Ann"}]"#,
            )
            .unwrap();

        let users = UserStore::new(&store);
        let found = users.get_by_email("a@x.com").unwrap().unwrap();
        assert!(found.purchased_products.is_empty());
    }
}
