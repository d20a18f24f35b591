//! Account sign-in against the Evident API.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{normalize_api_base_url, ClientConfig};
use crate::error::{Error, Result};
use crate::gateway::{read_json, Credential};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub subscription_status: Option<String>,
}

/// A signed-in account: the bearer token plus the user it belongs to
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

impl AuthSession {
    pub fn credential(&self) -> Option<Credential> {
        Credential::new(self.access_token.clone())
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Durable home of the signed-in session (keychain, file, memory...)
pub trait SessionPersistence: Send + Sync {
    fn load_session(&self) -> Result<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> Result<()>;
    fn clear_session(&self) -> Result<()>;
}

/// Session persistence that lives only as long as the process
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    session: Arc<Mutex<Option<AuthSession>>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<AuthSession>>> {
        self.session
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))
    }
}

impl SessionPersistence for MemorySessionStore {
    fn load_session(&self) -> Result<Option<AuthSession>> {
        Ok(self.lock()?.clone())
    }

    fn save_session(&self, session: &AuthSession) -> Result<()> {
        *self.lock()? = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

/// Client for `/auth/login` and `/auth/register`
#[derive(Clone)]
pub struct AuthClient {
    base_url: String,
    client: Client,
}

impl AuthClient {
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let base_url = normalize_api_base_url(base_url.as_ref())?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| Error::Config(format!("failed to build HTTP client: {error}")))?;
        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.api_base_url(), config.request_timeout())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.post_credentials("/auth/login", email, password).await
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.post_credentials("/auth/register", email, password).await
    }

    async fn post_credentials(&self, path: &str, email: &str, password: &str) -> Result<AuthSession> {
        let email = validate_credentials(email, password)?;
        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });
        let request = self
            .client
            .post(format!("{}{path}", self.base_url))
            .header("Accept", "application/json")
            .json(&payload);

        let response: AuthResponse = read_json(request).await?;
        response.into_session()
    }
}

fn validate_credentials<'a>(email: &'a str, password: &str) -> Result<&'a str> {
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::Validation("Email is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(Error::Validation("Password is required".to_string()));
    }
    Ok(email)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    access_token: Option<String>,
    user: Option<AuthUser>,
}

impl AuthResponse {
    fn into_session(self) -> Result<AuthSession> {
        match (self.access_token, self.user) {
            (Some(access_token), Some(user)) if !access_token.trim().is_empty() => {
                Ok(AuthSession {
                    access_token: access_token.trim().to_string(),
                    user,
                })
            }
            _ => Err(Error::Server(
                "Auth response did not include an access token and user".to_string(),
            )),
        }
    }
}
