use super::{read_json, traits::KeyValueStore, write_json, KEY_SESSION, KEY_USERS};
use crate::{
    error::{MagicError, Result},
    models::{User, UserRecord},
};
use std::sync::Arc;
use uuid::Uuid;

/// Toy account store. Passwords are plaintext; this is a prototype gate, not security.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn KeyValueStore>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn users(&self) -> Result<Vec<UserRecord>> {
        Ok(read_json(self.store.as_ref(), KEY_USERS)?.unwrap_or_default())
    }

    fn start_session(&self, user: &User) -> Result<()> {
        write_json(self.store.as_ref(), KEY_SESSION, user)
    }

    pub fn current_user(&self) -> Result<Option<User>> {
        read_json(self.store.as_ref(), KEY_SESSION)
    }

    /// Email matching ignores case. The password is compared untrimmed.
    pub fn login(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        let users = self.users()?;

        let Some(record) = users.iter().find(|u| u.email.to_lowercase() == email) else {
            log::warn!("Login failed: user not found for email {}", email);
            return Err(MagicError::InvalidCredentials);
        };
        if record.password != password {
            log::warn!("Login failed: password mismatch for {}", email);
            return Err(MagicError::InvalidCredentials);
        }

        let user = record.to_user();
        self.start_session(&user)?;
        log::info!("👋 {} logged in", user.email);
        Ok(user)
    }

    pub fn signup(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        let password = password.trim();
        if email.is_empty() || password.is_empty() {
            return Err(MagicError::Validation("Email and password are required".into()));
        }

        let mut users = self.users()?;
        if users.iter().any(|u| u.email.to_lowercase() == email) {
            return Err(MagicError::DuplicateEmail);
        }

        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email,
            password: password.to_string(),
        };
        let user = record.to_user();
        users.push(record);
        write_json(self.store.as_ref(), KEY_USERS, &users)?;
        self.start_session(&user)?;
        log::info!("🎉 Created account for {}", user.email);
        Ok(user)
    }

    pub fn logout(&self) -> Result<()> {
        self.store.remove(KEY_SESSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn auth_with_user() -> AuthService {
        let auth = AuthService::new(Arc::new(MemoryStore::new()));
        auth.signup("Ada", "a@b.com", "secret").unwrap();
        auth.logout().unwrap();
        auth
    }

    #[test]
    fn login_ignores_email_case() {
        let auth = auth_with_user();
        let user = auth.login("A@B.com", "secret").unwrap();
        assert_eq!(user.email, "a@b.com");
        assert_eq!(auth.current_user().unwrap(), Some(user));
    }

    #[test]
    fn wrong_password_or_unknown_email_is_invalid() {
        let auth = auth_with_user();
        assert!(matches!(auth.login("a@b.com", "wrong"), Err(MagicError::InvalidCredentials)));
        assert!(matches!(auth.login("x@y.com", "secret"), Err(MagicError::InvalidCredentials)));
        assert!(matches!(auth.login("a@b.com", " secret "), Err(MagicError::InvalidCredentials)));
        assert_eq!(auth.current_user().unwrap(), None);
    }

    #[test]
    fn duplicate_email_rejected_regardless_of_other_fields() {
        let auth = auth_with_user();
        for (name, email, password) in [
            ("Ada", "a@b.com", "secret"),
            ("Someone Else", "A@B.COM", "other"),
            ("", "  a@b.com ", "x"),
        ] {
            assert!(matches!(
                auth.signup(name, email, password),
                Err(MagicError::DuplicateEmail)
            ));
        }
    }

    #[test]
    fn blank_fields_rejected() {
        let auth = AuthService::new(Arc::new(MemoryStore::new()));
        assert!(matches!(auth.signup("Ada", "  ", "pw"), Err(MagicError::Validation(_))));
        assert!(matches!(auth.signup("Ada", "a@b.com", "   "), Err(MagicError::Validation(_))));
    }

    #[test]
    fn signup_trims_and_starts_session() {
        let auth = AuthService::new(Arc::new(MemoryStore::new()));
        let user = auth.signup("  Ada ", " Ada@Example.com ", " pw ").unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(auth.current_user().unwrap(), Some(user.clone()));
        auth.logout().unwrap();
        assert!(auth.login("ada@example.com", "pw").is_ok());
    }

    #[test]
    fn corrupt_session_reads_as_logged_out() {
        let store = Arc::new(MemoryStore::new());
        store.set(KEY_SESSION, "{oops").unwrap();
        let auth = AuthService::new(store);
        assert_eq!(auth.current_user().unwrap(), None);
    }
}
