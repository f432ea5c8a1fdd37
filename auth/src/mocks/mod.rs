//! In-memory provider implementations for testing.
//!
//! The three mocks share one [`InMemoryIdentityStore`], so a role written by
//! the service is what the client sees after its next token refresh:
//!
//! ```ignore
//! let store = InMemoryIdentityStore::new();
//! let provider = MockIdentityProvider::new(store.clone());
//! let roles = InProcessRoleClient::new(store.clone());
//! ```

pub mod identity_provider;
pub mod identity_store;
pub mod role_client;

pub use identity_provider::MockIdentityProvider;
pub use identity_store::InMemoryIdentityStore;
pub use role_client::InProcessRoleClient;
