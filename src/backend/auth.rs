use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::common::Session;
use crate::config::IdentityConfig;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no identity configured: display name is empty")]
    MissingIdentity,
    #[error("identity provider rejected the sign-in: {0}")]
    Provider(String),
}

/// External identity provider boundary. The watch channel is the single
/// write path for the process-wide session: the provider writes, everyone
/// else holds read-only receivers.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self) -> Result<Session, AuthError>;
    async fn sign_out(&self);
    /// Receiver whose current value is the session right now; every change
    /// is observable through it.
    fn watch_session(&self) -> watch::Receiver<Option<Session>>;
}

/// Provider implementation backed by a locally configured identity. The uid
/// stays stable for the lifetime of the process, like a provider account id.
pub struct DevAuth {
    identity: IdentityConfig,
    uid: String,
    session: watch::Sender<Option<Session>>,
}

impl DevAuth {
    pub fn new(identity: IdentityConfig) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            identity,
            uid: Uuid::new_v4().to_string(),
            session,
        }
    }
}

#[async_trait]
impl AuthProvider for DevAuth {
    async fn sign_in(&self) -> Result<Session, AuthError> {
        if self.identity.display_name.trim().is_empty() {
            return Err(AuthError::MissingIdentity);
        }
        let session = Session {
            uid: self.uid.clone(),
            display_name: self.identity.display_name.clone(),
            email: self.identity.email.clone(),
            photo_url: self.identity.photo_url.clone(),
        };
        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) {
        self.session.send_replace(None);
    }

    fn watch_session(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: &str) -> IdentityConfig {
        IdentityConfig {
            display_name: name.to_string(),
            email: "ana@example.com".to_string(),
            photo_url: String::new(),
        }
    }

    #[tokio::test]
    async fn sign_in_publishes_session_on_watch() {
        let auth = DevAuth::new(identity("Ana"));
        let rx = auth.watch_session();
        assert!(rx.borrow().is_none());

        let session = auth.sign_in().await.unwrap();
        assert_eq!(session.display_name, "Ana");
        assert_eq!(rx.borrow().as_ref(), Some(&session));

        auth.sign_out().await;
        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn blank_display_name_is_rejected() {
        let auth = DevAuth::new(identity("   "));
        assert!(matches!(
            auth.sign_in().await,
            Err(AuthError::MissingIdentity)
        ));
    }

    #[tokio::test]
    async fn uid_is_stable_across_sign_ins() {
        let auth = DevAuth::new(identity("Ana"));
        let first = auth.sign_in().await.unwrap();
        auth.sign_out().await;
        let second = auth.sign_in().await.unwrap();
        assert_eq!(first.uid, second.uid);
    }
}
