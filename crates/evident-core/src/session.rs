//! Explicit session context holding the current credential.
//!
//! Created once at startup from whatever the persistence layer remembers.
//! Signing out clears the credential only; queued logs are never touched
//! here.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{AuthSession, AuthUser, MemorySessionStore, SessionPersistence};
use crate::error::Result;
use crate::gateway::Credential;

pub struct SessionContext {
    persistence: Arc<dyn SessionPersistence>,
    current: RwLock<Option<AuthSession>>,
}

impl SessionContext {
    /// Load the persisted session, if any.
    pub fn restore(persistence: impl SessionPersistence + 'static) -> Result<Self> {
        let current = persistence.load_session()?;
        if let Some(session) = &current {
            tracing::debug!(user = %session.user.email, "Restored persisted session");
        }
        Ok(Self {
            persistence: Arc::new(persistence),
            current: RwLock::new(current),
        })
    }

    /// A signed-out session that remembers nothing across restarts
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            persistence: Arc::new(MemorySessionStore::new()),
            current: RwLock::new(None),
        }
    }

    /// The bearer credential, or `None` when offline/unauthenticated
    pub async fn credential(&self) -> Option<Credential> {
        self.current
            .read()
            .await
            .as_ref()
            .and_then(AuthSession::credential)
    }

    pub async fn user(&self) -> Option<AuthUser> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|session| session.user.clone())
    }

    pub async fn is_signed_in(&self) -> bool {
        self.credential().await.is_some()
    }

    /// Persist and adopt `session`.
    pub async fn sign_in(&self, session: AuthSession) -> Result<()> {
        self.persistence.save_session(&session)?;
        tracing::info!(user = %session.user.email, "Signed in");
        *self.current.write().await = Some(session);
        Ok(())
    }

    /// Forget the credential here and in persistence.
    pub async fn sign_out(&self) -> Result<()> {
        self.persistence.clear_session()?;
        *self.current.write().await = None;
        tracing::info!("Signed out");
        Ok(())
    }
}
