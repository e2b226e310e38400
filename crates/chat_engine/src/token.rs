use std::sync::{Mutex, PoisonError};

use chat_core::Credential;
use chat_logging::chat_info;
use tokio::sync::watch;

use crate::TokenError;

/// Identity-provider collaborator.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// A fresh credential, or `None` when nobody is signed in.
    async fn credential(&self) -> Result<Option<Credential>, TokenError>;

    /// Ends the identity-provider session.
    async fn sign_out(&self) -> Result<(), TokenError>;

    /// Signed-in presence; the current value is readable immediately.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Holds a single credential supplied up front (e.g. from the environment).
pub struct StaticTokenProvider {
    credential: Mutex<Option<Credential>>,
    presence: watch::Sender<bool>,
}

impl StaticTokenProvider {
    pub fn new(credential: Option<Credential>) -> Self {
        let (presence, _) = watch::channel(credential.is_some());
        Self {
            credential: Mutex::new(credential),
            presence,
        }
    }

    pub fn from_env(var: &str) -> Self {
        let credential = std::env::var(var)
            .ok()
            .as_deref()
            .and_then(Credential::from_raw);
        Self::new(credential)
    }

    pub fn sign_in(&self, credential: Credential) {
        chat_info!("signed in with credential {}", credential.fingerprint());
        *self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential);
        self.presence.send_replace(true);
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn credential(&self) -> Result<Option<Credential>, TokenError> {
        Ok(self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn sign_out(&self) -> Result<(), TokenError> {
        let previous = self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            chat_info!("identity session terminated");
        }
        self.presence.send_replace(false);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.presence.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_out_clears_credential_and_presence() {
        let provider = StaticTokenProvider::new(Some(Credential::new("tok")));
        let mut presence = provider.subscribe();
        assert!(*presence.borrow_and_update());
        assert_eq!(provider.credential().await, Ok(Some(Credential::new("tok"))));

        provider.sign_out().await.unwrap();

        presence.changed().await.unwrap();
        assert!(!*presence.borrow());
        assert_eq!(provider.credential().await, Ok(None));
    }

    #[tokio::test]
    async fn sign_in_restores_presence() {
        let provider = StaticTokenProvider::new(None);
        let presence = provider.subscribe();
        assert!(!*presence.borrow());

        provider.sign_in(Credential::new("fresh"));

        assert!(*presence.borrow());
        assert_eq!(
            provider.credential().await,
            Ok(Some(Credential::new("fresh")))
        );
    }
}
