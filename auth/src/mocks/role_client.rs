//! Role client that calls the service in-process.

use super::InMemoryIdentityStore;
use crate::error::{AuthError, Result};
use crate::providers::{RoleAssignmentClient, TokenVerifier};
use crate::role::Role;
use crate::service::RoleAssignmentService;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// [`RoleAssignmentClient`] that skips HTTP and calls a
/// [`RoleAssignmentService`] over the shared in-memory store.
#[derive(Debug, Clone)]
pub struct InProcessRoleClient {
    service: Arc<RoleAssignmentService<InMemoryIdentityStore>>,
    unreachable: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl InProcessRoleClient {
    /// Create a client for a service writing to `store`.
    #[must_use]
    pub fn new(store: InMemoryIdentityStore) -> Self {
        Self {
            service: Arc::new(RoleAssignmentService::new(store)),
            unreachable: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Simulate the service being down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Number of `set_user_role` calls received.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RoleAssignmentClient for InProcessRoleClient {
    fn set_user_role(
        &self,
        id_token: &str,
        role: Role,
    ) -> impl Future<Output = Result<Role>> + Send {
        let service = Arc::clone(&self.service);
        let unreachable = self.unreachable.load(Ordering::SeqCst);
        let id_token = id_token.to_string();
        self.calls.fetch_add(1, Ordering::SeqCst);

        async move {
            if unreachable {
                return Err(AuthError::Provider("role service unreachable".into()));
            }
            let caller = service.store().verify(&id_token).await.ok();
            service
                .self_assign(caller.as_ref(), None, Some(role.as_str()))
                .await
        }
    }
}
