//! HTTP client for the role service callables.

use crate::config::RoleClientConfig;
use crate::error::{AuthError, Result};
use crate::providers::RoleAssignmentClient;
use crate::role::Role;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// [`RoleAssignmentClient`] that posts to `{base_url}/setUserRole`.
#[derive(Clone, Debug)]
pub struct CallableRoleClient {
    http_client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct SetUserRoleRequest {
    role: Role,
}

#[derive(Deserialize)]
struct RoleResponse {
    success: bool,
    role: Option<Role>,
}

#[derive(Deserialize)]
struct CallableError {
    code: String,
    #[serde(default)]
    message: String,
}

impl CallableError {
    fn into_auth_error(self) -> AuthError {
        match self.code.as_str() {
            "unauthenticated" => AuthError::Unauthenticated,
            "permission-denied" => AuthError::permission_denied(self.message),
            "invalid-argument" => AuthError::invalid_argument(self.message),
            _ => AuthError::Internal(self.message),
        }
    }
}

impl CallableRoleClient {
    /// Create a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if the HTTP client cannot be built.
    pub fn new(config: &RoleClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl RoleAssignmentClient for CallableRoleClient {
    #[tracing::instrument(skip(self, id_token))]
    async fn set_user_role(&self, id_token: &str, role: Role) -> Result<Role> {
        let response = self
            .http_client
            .post(format!("{}/setUserRole", self.base_url))
            .bearer_auth(id_token)
            .json(&SetUserRoleRequest { role })
            .send()
            .await
            .map_err(|e| AuthError::Provider(format!("Role service unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<CallableError>(&body) {
                Ok(error) => error.into_auth_error(),
                Err(_) => AuthError::Provider(format!(
                    "Role service returned {}: {body}",
                    status.as_u16()
                )),
            });
        }

        let body: RoleResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("Failed to parse role response: {e}")))?;

        match body {
            RoleResponse {
                success: true,
                role: Some(assigned),
            } => Ok(assigned),
            RoleResponse { success: true, role: None } => Ok(role),
            RoleResponse { success: false, .. } => {
                Err(AuthError::Internal("Role service reported failure".into()))
            },
        }
    }
}
