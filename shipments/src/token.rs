//! Where the client gets its bearer token.

use shiptrack_auth::IdentityProvider;
use std::future::Future;

/// Supplies the identity token for the `Authorization` header.
pub trait TokenSource: Send + Sync {
    /// Current token, or `None` to send the request anonymously.
    fn bearer_token(&self) -> impl Future<Output = Option<String>> + Send;
}

/// Token of whoever is signed in to an [`IdentityProvider`].
#[derive(Debug, Clone)]
pub struct ProviderTokenSource<P> {
    provider: P,
}

impl<P: IdentityProvider> ProviderTokenSource<P> {
    /// Read tokens from `provider`.
    #[must_use]
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: IdentityProvider> TokenSource for ProviderTokenSource<P> {
    async fn bearer_token(&self) -> Option<String> {
        self.provider.current_user()?;
        match self.provider.id_token_result(false).await {
            Ok(result) => Some(result.token),
            Err(err) => {
                tracing::warn!(error = %err, "Could not read identity token; sending request without it");
                None
            },
        }
    }
}

/// A fixed token, or none at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticToken(pub Option<String>);

impl StaticToken {
    /// Always send `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Never send a token.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self(None)
    }
}

impl TokenSource for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}
