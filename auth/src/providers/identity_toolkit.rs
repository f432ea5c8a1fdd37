//! Identity Toolkit REST API adapter.
//!
//! Implements [`IdentityStore`] and [`TokenVerifier`] over the
//! `accounts:lookup` and `accounts:update` endpoints, against either the
//! production API or a local auth emulator.

use crate::config::IdentityToolkitConfig;
use crate::error::{AuthError, Result};
use crate::providers::{IdentityStore, TokenVerifier, UserRecord, VerifiedToken};
use crate::role::Claims;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

/// Key sent on id-token lookups when talking to an emulator without one.
const EMULATOR_API_KEY: &str = "emulator-api-key";

/// [`IdentityStore`] and [`TokenVerifier`] backed by the Identity Toolkit API.
#[derive(Clone, Debug)]
pub struct IdentityToolkitStore {
    http_client: Client,
    config: IdentityToolkitConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupByUid<'a> {
    local_id: [&'a str; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupByToken<'a> {
    id_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAccount<'a> {
    local_id: &'a str,
    custom_attributes: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    email: Option<String>,
    /// Claims as a JSON-encoded string.
    #[serde(default)]
    custom_attributes: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

impl AccountInfo {
    fn into_record(self) -> Result<UserRecord> {
        let claims = Claims::from_json_str(self.custom_attributes.as_deref().unwrap_or_default())?;
        Ok(UserRecord {
            uid: self.local_id,
            email: self.email,
            claims,
        })
    }
}

impl IdentityToolkitStore {
    /// Create a store for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if the HTTP client cannot be built.
    pub fn new(config: IdentityToolkitConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &IdentityToolkitConfig {
        &self.config
    }

    fn project_url(&self, method: &str) -> String {
        format!(
            "{}/v1/projects/{}/{method}",
            self.config.base_url(),
            self.config.project_id
        )
    }

    /// Bearer for admin calls. A configured token file is read fresh each time.
    async fn admin_bearer(&self) -> Result<String> {
        let token_file = self
            .config
            .access_token_file
            .as_ref()
            .filter(|_| self.config.emulator_host.is_none());

        if let Some(path) = token_file {
            let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
                AuthError::Internal(format!(
                    "Failed to read admin access token from {}: {e}",
                    path.display()
                ))
            })?;
            let token = contents.trim();
            if token.is_empty() {
                return Err(AuthError::Internal(format!(
                    "Admin access token file {} is empty",
                    path.display()
                )));
            }
            return Ok(token.to_string());
        }

        self.config
            .admin_bearer()
            .map(str::to_string)
            .ok_or_else(|| {
                AuthError::Internal("No admin access token configured for Identity Toolkit".into())
            })
    }

    async fn admin_request(&self, method: &str) -> Result<RequestBuilder> {
        let bearer = self.admin_bearer().await?;
        Ok(self
            .http_client
            .post(self.project_url(method))
            .bearer_auth(bearer))
    }

    fn log_admin_failure(status: StatusCode, message: &str, what: &str) {
        if status == StatusCode::UNAUTHORIZED {
            tracing::error!(
                reason = %message,
                "{what} rejected the admin access token; it has likely expired"
            );
        } else {
            tracing::error!(status = %status, reason = %message, "{what} failed");
        }
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|e| AuthError::Provider(format!("Identity Toolkit request failed: {e}")))
    }

    /// Read the provider's error message (e.g. `USER_NOT_FOUND`) from a failed response.
    async fn error_message(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);
        (status, message)
    }
}

impl IdentityStore for IdentityToolkitStore {
    #[tracing::instrument(skip(self))]
    async fn get_user(&self, uid: &str) -> Result<UserRecord> {
        let request = self
            .admin_request("accounts:lookup")
            .await?
            .json(&LookupByUid { local_id: [uid] });
        let response = Self::send(request).await?;

        if !response.status().is_success() {
            let (status, message) = Self::error_message(response).await;
            Self::log_admin_failure(status, &message, "Account lookup");
            return Err(AuthError::Provider(format!(
                "accounts:lookup returned {}: {message}",
                status.as_u16()
            )));
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("Failed to parse lookup response: {e}")))?;

        body.users
            .into_iter()
            .find(|account| account.local_id == uid)
            .ok_or_else(|| AuthError::UserNotFound {
                uid: uid.to_string(),
            })?
            .into_record()
    }

    #[tracing::instrument(skip(self, claims))]
    async fn set_claims(&self, uid: &str, claims: Claims) -> Result<()> {
        let request = self.admin_request("accounts:update").await?.json(&UpdateAccount {
            local_id: uid,
            custom_attributes: claims.to_json_string()?,
        });
        let response = Self::send(request).await?;

        if response.status().is_success() {
            tracing::debug!(uid = %uid, "Custom claims updated");
            return Ok(());
        }

        let (status, message) = Self::error_message(response).await;
        if message.starts_with("USER_NOT_FOUND") {
            return Err(AuthError::UserNotFound {
                uid: uid.to_string(),
            });
        }
        Self::log_admin_failure(status, &message, "Claim update");
        Err(AuthError::Provider(format!(
            "accounts:update returned {}: {message}",
            status.as_u16()
        )))
    }
}

impl TokenVerifier for IdentityToolkitStore {
    async fn verify(&self, token: &str) -> Result<VerifiedToken> {
        let api_key = match (&self.config.api_key, &self.config.emulator_host) {
            (Some(key), _) => key.as_str(),
            (None, Some(_)) => EMULATOR_API_KEY,
            (None, None) => {
                return Err(AuthError::Internal(
                    "No API key configured for Identity Toolkit".into(),
                ));
            },
        };

        let request = self
            .http_client
            .post(format!("{}/v1/accounts:lookup", self.config.base_url()))
            .query(&[("key", api_key)])
            .json(&LookupByToken { id_token: token });
        let response = Self::send(request).await?;

        match response.status() {
            status if status.is_success() => {},
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                let (_, message) = Self::error_message(response).await;
                tracing::debug!(reason = %message, "Id token rejected");
                return Err(AuthError::Unauthenticated);
            },
            _ => {
                let (status, message) = Self::error_message(response).await;
                tracing::error!(status = %status, reason = %message, "Token lookup failed");
                return Err(AuthError::Provider(format!(
                    "accounts:lookup returned {}: {message}",
                    status.as_u16()
                )));
            },
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("Failed to parse lookup response: {e}")))?;
        let record = body
            .users
            .into_iter()
            .next()
            .ok_or(AuthError::Unauthenticated)?
            .into_record()?;

        Ok(VerifiedToken {
            uid: record.uid,
            email: record.email,
            claims: record.claims,
        })
    }
}
