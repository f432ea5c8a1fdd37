//! In-memory identity store.

use crate::error::{AuthError, Result};
use crate::providers::{IdentityStore, TokenVerifier, UserRecord, VerifiedToken};
use crate::role::Claims;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const TOKEN_PREFIX: &str = "mock-id-token:";

/// In-memory [`IdentityStore`] and [`TokenVerifier`].
///
/// Tokens issued by [`InMemoryIdentityStore::issue_token`] verify to the
/// user's current record. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityStore {
    users: Arc<Mutex<HashMap<String, UserRecord>>>,
    writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryIdentityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user without counting it as a claim write.
    pub fn insert_user(&self, uid: &str, claims: Claims) {
        self.insert_record(UserRecord {
            uid: uid.to_string(),
            email: None,
            claims,
        });
    }

    /// Add or replace a full user record.
    pub fn insert_record(&self, record: UserRecord) {
        if let Ok(mut users) = self.users.lock() {
            users.insert(record.uid.clone(), record);
        }
    }

    /// Current claims of `uid`.
    #[must_use]
    pub fn claims(&self, uid: &str) -> Option<Claims> {
        self.users
            .lock()
            .ok()
            .and_then(|users| users.get(uid).map(|u| u.claims.clone()))
    }

    /// Number of successful `set_claims` calls so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every following `set_claims` fail with a provider error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Mint a bearer token for `uid`.
    #[must_use]
    pub fn issue_token(uid: &str) -> String {
        format!("{TOKEN_PREFIX}{uid}")
    }

    fn lookup(&self, uid: &str) -> Result<UserRecord> {
        self.users
            .lock()
            .map_err(|_| AuthError::Internal("identity store lock poisoned".into()))?
            .get(uid)
            .cloned()
            .ok_or_else(|| AuthError::UserNotFound {
                uid: uid.to_string(),
            })
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn get_user(&self, uid: &str) -> impl Future<Output = Result<UserRecord>> + Send {
        let result = self.lookup(uid);
        async move { result }
    }

    fn set_claims(&self, uid: &str, claims: Claims) -> impl Future<Output = Result<()>> + Send {
        let users = Arc::clone(&self.users);
        let writes = Arc::clone(&self.writes);
        let fail = self.fail_writes.load(Ordering::SeqCst);
        let uid = uid.to_string();

        async move {
            if fail {
                return Err(AuthError::Provider("claim write rejected".into()));
            }

            let mut users = users
                .lock()
                .map_err(|_| AuthError::Internal("identity store lock poisoned".into()))?;
            let record = users
                .get_mut(&uid)
                .ok_or_else(|| AuthError::UserNotFound { uid: uid.clone() })?;
            record.claims = claims;
            writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}

impl TokenVerifier for InMemoryIdentityStore {
    fn verify(&self, token: &str) -> impl Future<Output = Result<VerifiedToken>> + Send {
        let result = token
            .strip_prefix(TOKEN_PREFIX)
            .ok_or(AuthError::Unauthenticated)
            .and_then(|uid| self.lookup(uid).map_err(|_| AuthError::Unauthenticated))
            .map(|record| VerifiedToken {
                uid: record.uid,
                email: record.email,
                claims: record.claims,
            });

        async move { result }
    }
}
