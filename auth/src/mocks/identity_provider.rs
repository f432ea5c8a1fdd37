//! In-memory client-side identity provider.

use super::InMemoryIdentityStore;
use crate::error::{AuthError, Result};
use crate::providers::{AuthUser, IdTokenResult, IdentityProvider, UserRecord};
use crate::role::Claims;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

#[derive(Debug, Default)]
struct Session {
    /// email → (uid, password)
    accounts: HashMap<String, (String, String)>,
    current: Option<AuthUser>,
    /// Claims baked into the current token; refreshed only on force refresh.
    token_claims: Claims,
}

/// In-memory [`IdentityProvider`] backed by an [`InMemoryIdentityStore`].
///
/// Mirrors the real provider's propagation delay: a token keeps the claims
/// it was minted with until `id_token_result(true)` is called.
#[derive(Debug, Clone)]
pub struct MockIdentityProvider {
    store: InMemoryIdentityStore,
    session: Arc<Mutex<Session>>,
    events: broadcast::Sender<Option<AuthUser>>,
    refreshes: Arc<AtomicUsize>,
}

impl MockIdentityProvider {
    /// Create a provider on top of `store`.
    #[must_use]
    pub fn new(store: InMemoryIdentityStore) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            store,
            session: Arc::new(Mutex::new(Session::default())),
            events,
            refreshes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register an existing account with the given claims.
    pub fn add_account(&self, uid: &str, email: &str, password: &str, claims: Claims) {
        self.store.insert_record(UserRecord {
            uid: uid.to_string(),
            email: Some(email.to_string()),
            claims,
        });
        if let Ok(mut session) = self.session.lock() {
            session
                .accounts
                .insert(email.to_string(), (uid.to_string(), password.to_string()));
        }
    }

    /// The shared identity store.
    #[must_use]
    pub const fn store(&self) -> &InMemoryIdentityStore {
        &self.store
    }

    /// How many forced token refreshes have happened.
    #[must_use]
    pub fn forced_refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Announce a state change as the real provider's listener would.
    pub fn emit(&self, user: Option<AuthUser>) {
        // No subscribers is fine
        let _ = self.events.send(user);
    }

    fn start_session(&self, user: &AuthUser) -> Result<()> {
        let claims = self.store.claims(&user.uid).unwrap_or_default();
        let mut session = self.lock()?;
        session.current = Some(user.clone());
        session.token_claims = claims;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Session>> {
        self.session
            .lock()
            .map_err(|_| AuthError::Internal("provider session lock poisoned".into()))
    }
}

impl IdentityProvider for MockIdentityProvider {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthUser>> + Send {
        let result = self.lock().and_then(|session| {
            session
                .accounts
                .get(email)
                .filter(|(_, expected)| expected == password)
                .map(|(uid, _)| AuthUser {
                    uid: uid.clone(),
                    email: email.to_string(),
                })
                .ok_or(AuthError::Unauthenticated)
        });
        let result = result.and_then(|user| {
            self.start_session(&user)?;
            self.emit(Some(user.clone()));
            Ok(user)
        });

        async move { result }
    }

    fn create_user(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthUser>> + Send {
        let result = self.lock().and_then(|session| {
            if session.accounts.contains_key(email) {
                Err(AuthError::invalid_argument("Email already in use"))
            } else {
                Ok(())
            }
        });
        let result = result.and_then(|()| {
            let uid = uuid::Uuid::new_v4().simple().to_string();
            self.add_account(&uid, email, password, Claims::new());
            let user = AuthUser {
                uid,
                email: email.to_string(),
            };
            self.start_session(&user)?;
            self.emit(Some(user.clone()));
            Ok(user)
        });

        async move { result }
    }

    fn sign_out(&self) -> impl Future<Output = Result<()>> + Send {
        let result = self.lock().map(|mut session| {
            session.current = None;
            session.token_claims = Claims::new();
        });
        if result.is_ok() {
            self.emit(None);
        }

        async move { result }
    }

    fn id_token_result(
        &self,
        force_refresh: bool,
    ) -> impl Future<Output = Result<IdTokenResult>> + Send {
        let result = self.lock().and_then(|mut session| {
            let user = session.current.clone().ok_or(AuthError::Unauthenticated)?;
            if force_refresh {
                session.token_claims = self.store.claims(&user.uid).unwrap_or_default();
                self.refreshes.fetch_add(1, Ordering::SeqCst);
            }
            Ok(IdTokenResult {
                token: InMemoryIdentityStore::issue_token(&user.uid),
                claims: session.token_claims.clone(),
            })
        });

        async move { result }
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.session.lock().ok().and_then(|s| s.current.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<Option<AuthUser>> {
        self.events.subscribe()
    }
}
