//! Signup and login against a pluggable credential store.
//!
//! Passwords are kept as plain strings in memory. Nothing here survives a
//! restart.

use std::collections::HashMap;
use std::fmt;

/// Storage behind the auth gate
pub trait CredentialStore {
    /// Insert unless the email is already registered. Returns false on conflict.
    fn put_if_absent(&mut self, email: &str, password: &str) -> bool;
    fn get(&self, email: &str) -> Option<&str>;
}

/// Process-wide in-memory store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore for MemoryCredentialStore {
    fn put_if_absent(&mut self, email: &str, password: &str) -> bool {
        if self.users.contains_key(email) {
            return false;
        }
        self.users.insert(email.to_string(), password.to_string());
        true
    }

    fn get(&self, email: &str) -> Option<&str> {
        self.users.get(email).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingFields,
    UserExists,
    InvalidLogin,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuthError::MissingFields => "Enter email & password",
            AuthError::UserExists => "User already exists",
            AuthError::InvalidLogin => "Invalid login",
        })
    }
}

impl std::error::Error for AuthError {}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub logged_in: bool,
    pub email: Option<String>,
}

pub struct AuthGate<S> {
    store: S,
    session: Session,
}

impl<S: CredentialStore> AuthGate<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.logged_in
    }

    /// Register a new user and start their session
    pub fn signup(&mut self, email: &str, password: &str) -> Result<&'static str, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if !self.store.put_if_absent(email, password) {
            tracing::info!(email, "signup rejected, user exists");
            return Err(AuthError::UserExists);
        }
        self.session = Session {
            logged_in: true,
            email: Some(email.to_string()),
        };
        tracing::info!(email, "user signed up");
        Ok("Signup successful!")
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<&'static str, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        match self.store.get(email) {
            Some(stored) if stored == password => {
                self.session = Session {
                    logged_in: true,
                    email: Some(email.to_string()),
                };
                tracing::info!(email, "user logged in");
                Ok("Login successful!")
            }
            _ => {
                tracing::info!(email, "login failed");
                Err(AuthError::InvalidLogin)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(email) = self.session.email.take() {
            tracing::info!(%email, "user logged out");
        }
        self.session = Session::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AuthGate<MemoryCredentialStore> {
        AuthGate::new(MemoryCredentialStore::default())
    }

    #[test]
    fn test_signup_then_login_scenario() {
        let mut auth = gate();
        assert_eq!(auth.signup("a@x.com", "pw1"), Ok("Signup successful!"));
        assert!(auth.is_logged_in());
        assert_eq!(auth.session().email.as_deref(), Some("a@x.com"));
        auth.logout();

        let err = auth.signup("a@x.com", "pw2").unwrap_err();
        assert_eq!(err.to_string(), "User already exists");
        assert!(!auth.is_logged_in());

        let err = auth.login("a@x.com", "pw2").unwrap_err();
        assert_eq!(err.to_string(), "Invalid login");
        assert!(!auth.is_logged_in());

        assert_eq!(auth.login("a@x.com", "pw1"), Ok("Login successful!"));
        assert!(auth.session().logged_in);
        assert_eq!(auth.session().email.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn test_missing_fields() {
        let mut auth = gate();
        assert_eq!(auth.signup("", "pw"), Err(AuthError::MissingFields));
        assert_eq!(auth.login("a@x.com", ""), Err(AuthError::MissingFields));
        assert_eq!(AuthError::MissingFields.to_string(), "Enter email & password");
    }

    #[test]
    fn test_failed_signup_keeps_current_session() {
        let mut auth = gate();
        auth.signup("a@x.com", "pw1").unwrap();
        assert_eq!(auth.signup("a@x.com", "pw2"), Err(AuthError::UserExists));
        assert_eq!(auth.session().email.as_deref(), Some("a@x.com"));

        auth.logout();
        assert_eq!(auth.signup("b@x.com", ""), Err(AuthError::MissingFields));
        assert_eq!(auth.session(), &Session::default());
    }

    #[test]
    fn test_unknown_user_is_invalid_login() {
        let mut auth = gate();
        assert_eq!(auth.login("nobody@x.com", "pw"), Err(AuthError::InvalidLogin));
    }

    #[test]
    fn test_logout_clears_session() {
        let mut auth = gate();
        auth.signup("a@x.com", "pw1").unwrap();
        auth.login("a@x.com", "pw1").unwrap();
        auth.logout();
        assert_eq!(auth.session(), &Session::default());
    }
}
