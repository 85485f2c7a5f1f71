use chrono::Utc;
use parking_lot::RwLock;

use super::{jwt, Identity};

/// Read access to the current identity. Components receive this as a
/// capability so they can run against a fixed identity in tests.
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Option<Identity>;

    fn token(&self) -> Option<String> {
        self.current().map(|identity| identity.token)
    }

    fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }
}

/// In-memory session: anonymous -> authenticated -> anonymous.
#[derive(Debug, Default)]
pub struct Session {
    identity: RwLock<Option<Identity>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(identity: Identity) -> Self {
        Self {
            identity: RwLock::new(Some(identity)),
        }
    }

    pub fn sign_in(&self, identity: Identity) {
        tracing::info!(user = %identity.user.email, "session authenticated");
        *self.identity.write() = Some(identity);
    }

    pub fn sign_out(&self) -> Option<Identity> {
        let previous = self.identity.write().take();
        if previous.is_some() {
            tracing::info!("session ended");
        }
        previous
    }
}

impl IdentityProvider for Session {
    fn current(&self) -> Option<Identity> {
        let guard = self.identity.read();
        let identity = guard.as_ref()?;

        if jwt::is_expired(&identity.token, Utc::now()) {
            tracing::debug!("session token expired");
            return None;
        }

        Some(identity.clone())
    }
}
