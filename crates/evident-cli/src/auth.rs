//! Keychain persistence for the signed-in session, one entry per profile.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use evident_core::auth::{AuthSession, SessionPersistence};
use evident_core::{Error, Result};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "evident-cli";

#[derive(Clone)]
pub struct KeyringSessionStore {
    username: String,
}

impl KeyringSessionStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            username: format!("session:{profile_name}"),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> Result<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username).map_err(keychain_error)
    }
}

#[cfg(not(test))]
fn keychain_error(error: keyring::Error) -> Error {
    Error::Storage(format!("keychain: {error}"))
}

#[cfg(test)]
fn lock_error<T>(error: std::sync::PoisonError<T>) -> Error {
    Error::Storage(error.to_string())
}

impl SessionPersistence for KeyringSessionStore {
    #[cfg(not(test))]
    fn load_session(&self) -> Result<Option<AuthSession>> {
        let entry = self.entry()?;
        match entry.get_password() {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(keychain_error(error)),
        }
    }

    #[cfg(test)]
    fn load_session(&self) -> Result<Option<AuthSession>> {
        let guard = Self::test_store().lock().map_err(lock_error)?;
        guard
            .get(&self.username)
            .map(|raw| serde_json::from_str(raw))
            .transpose()
            .map_err(Error::from)
    }

    #[cfg(not(test))]
    fn save_session(&self, session: &AuthSession) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        self.entry()?.set_password(&raw).map_err(keychain_error)
    }

    #[cfg(test)]
    fn save_session(&self, session: &AuthSession) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        let mut guard = Self::test_store().lock().map_err(lock_error)?;
        guard.insert(self.username.clone(), raw);
        Ok(())
    }

    #[cfg(not(test))]
    fn clear_session(&self) -> Result<()> {
        let entry = self.entry()?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(keychain_error(error)),
        }
    }

    #[cfg(test)]
    fn clear_session(&self) -> Result<()> {
        let mut guard = Self::test_store().lock().map_err(lock_error)?;
        guard.remove(&self.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use evident_core::auth::AuthUser;

    use super::*;

    fn session(token: &str) -> AuthSession {
        AuthSession {
            access_token: token.to_string(),
            user: AuthUser {
                id: "u1".to_string(),
                email: "tech@example.com".to_string(),
                subscription_status: None,
            },
        }
    }

    #[test]
    fn sessions_are_scoped_by_profile() {
        let work = KeyringSessionStore::new("keyring-test-work");
        let home = KeyringSessionStore::new("keyring-test-home");

        work.save_session(&session("work-token")).unwrap();
        assert_eq!(
            work.load_session().unwrap().map(|s| s.access_token),
            Some("work-token".to_string())
        );
        assert_eq!(home.load_session().unwrap(), None);

        work.clear_session().unwrap();
        assert_eq!(work.load_session().unwrap(), None);
    }

    #[test]
    fn clearing_missing_session_is_ok() {
        KeyringSessionStore::new("keyring-test-never-saved")
            .clear_session()
            .unwrap();
    }
}
