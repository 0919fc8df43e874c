//! Authentication lifecycle.
//!
//! The [`SessionManager`] owns the credential and the profile it resolves to.
//! Every other component reads session state through [`SessionManager::subscribe`]
//! and never writes it.
//!
//! # States
//!
//! 1. **Initializing** - persisted credential not read (or not resolved) yet
//! 2. **Unauthenticated** - no credential
//! 3. **Resolving** - credential set, profile request in flight
//! 4. **Authenticated** - credential and profile both present
//!
//! A failed profile resolution is treated as an invalid credential and
//! always settles to Unauthenticated.

use std::sync::Arc;

use tokio::sync::{watch, OnceCell};

use crate::api::{ApiClient, ApiError};
use crate::credential::{Credential, CredentialStore};
use crate::goals::goals_for;
use crate::models::{GoalTargets, Profile};

/// Snapshot of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub credential: Option<Credential>,
    pub profile: Option<Profile>,
    /// True until the persisted credential has been read and resolved.
    /// Session-dependent work must not start while this is set.
    pub initializing: bool,
}

impl SessionState {
    fn initial() -> Self {
        Self {
            credential: None,
            profile: None,
            initializing: true,
        }
    }

    /// Credential and profile are both present.
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some() && self.profile.is_some()
    }

    /// Credential is set but its profile has not arrived yet.
    pub fn is_resolving(&self) -> bool {
        self.credential.is_some() && self.profile.is_none()
    }
}

/// Owns the session credential and resolves it to a profile.
pub struct SessionManager {
    api: ApiClient,
    store: Arc<dyn CredentialStore>,
    state: watch::Sender<SessionState>,
    init: OnceCell<()>,
}

impl SessionManager {
    pub fn new(api: ApiClient, store: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        Self {
            api,
            store,
            state,
            init: OnceCell::new(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Receiver that observes every session transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.state.borrow().credential.clone()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.state.borrow().profile.clone()
    }

    pub fn is_initializing(&self) -> bool {
        self.state.borrow().initializing
    }

    /// Daily targets for the current profile.
    pub fn goals(&self) -> GoalTargets {
        goals_for(self.state.borrow().profile.as_ref())
    }

    /// Reads the persisted credential and resolves it.
    ///
    /// Only the first call does any work; later calls return immediately.
    /// The `initializing` flag is cleared once the session has settled.
    pub async fn initialize(&self) {
        self.init
            .get_or_init(|| async {
                let stored = match self.store.load() {
                    Ok(stored) => stored,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to load stored credential");
                        None
                    }
                };

                if let Some(credential) = stored {
                    tracing::debug!("Found stored credential, resolving profile");
                    self.state.send_modify(|s| {
                        s.credential = Some(credential.clone());
                        s.profile = None;
                    });
                    self.resolve_profile(credential).await;
                }

                self.state.send_modify(|s| s.initializing = false);
            })
            .await;
    }

    /// The only mutator of the credential.
    ///
    /// `Some` persists the token and resolves its profile before returning.
    /// `None` deletes the persisted token and clears the session at once.
    /// Storage failures are logged and never block the in-memory transition.
    pub async fn set_credential(&self, credential: Option<Credential>) {
        match credential {
            Some(credential) => {
                if let Err(e) = self.store.save(&credential) {
                    tracing::warn!(error = %e, "Failed to persist credential");
                }
                self.state.send_modify(|s| {
                    s.credential = Some(credential.clone());
                    s.profile = None;
                });
                self.resolve_profile(credential).await;
            }
            None => self.clear(),
        }
    }

    /// Exchanges email and password for a credential and resolves it.
    ///
    /// Returns the resolved profile, or `None` if the issued token could not
    /// be resolved (the session is then logged out). On error nothing is
    /// persisted and the session is unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<Profile>, ApiError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::InvalidRequest(
                "Please enter your email and password.".to_string(),
            ));
        }

        let credential = self.api.login(email, password).await?;
        tracing::info!("Login succeeded");

        self.set_credential(Some(credential)).await;
        Ok(self.profile())
    }

    pub async fn logout(&self) {
        self.set_credential(None).await;
    }

    /// Fetches the profile for `credential` and applies it if still current.
    async fn resolve_profile(&self, credential: Credential) {
        match self.api.me(&credential).await {
            Ok(profile) => {
                let applied = self.state.send_if_modified(|s| {
                    if s.credential.as_ref() == Some(&credential) {
                        s.profile = Some(profile);
                        true
                    } else {
                        false
                    }
                });
                if !applied {
                    tracing::debug!("Discarding profile for a superseded credential");
                }
            }
            Err(e) => {
                let still_current = self.state.borrow().credential.as_ref() == Some(&credential);
                if still_current {
                    tracing::warn!(error = %e, "Profile resolution failed, logging out");
                    self.clear();
                }
            }
        }
    }

    fn clear(&self) {
        if let Err(e) = self.store.delete() {
            tracing::warn!(error = %e, "Failed to delete persisted credential");
        }
        self.state.send_if_modified(|s| {
            let changed = s.credential.is_some() || s.profile.is_some();
            s.credential = None;
            s.profile = None;
            changed
        });
        tracing::info!("Session cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DEFAULT_TIMEOUT;
    use crate::credential::MemoryCredentialStore;

    fn manager(store: Arc<MemoryCredentialStore>) -> SessionManager {
        // Nothing listens on port 9; any request fails fast with a transport error
        let api = ApiClient::new("http://127.0.0.1:9/api", DEFAULT_TIMEOUT).unwrap();
        SessionManager::new(api, store)
    }

    #[tokio::test]
    async fn test_initialize_without_stored_credential() {
        let session = manager(Arc::new(MemoryCredentialStore::new()));
        assert!(session.is_initializing());

        session.initialize().await;

        let state = session.state();
        assert!(!state.initializing);
        assert!(state.credential.is_none());
        assert!(state.profile.is_none());
    }

    #[tokio::test]
    async fn test_unresolvable_stored_credential_is_cleared() {
        let store = Arc::new(MemoryCredentialStore::with_credential(Credential::new("old")));
        let session = manager(store.clone());

        session.initialize().await;

        assert!(!session.is_initializing());
        assert!(session.credential().is_none());
        assert!(session.profile().is_none());
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_store() {
        let store = Arc::new(MemoryCredentialStore::with_credential(Credential::new("t")));
        let session = manager(store.clone());

        session.logout().await;

        assert!(session.credential().is_none());
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_rejects_blank_input_without_network() {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = manager(store.clone());

        let err = session.login("  ", "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_state_predicates() {
        let mut state = SessionState::initial();
        assert!(!state.is_authenticated());
        state.credential = Some(Credential::new("t"));
        assert!(state.is_resolving());
    }
}
