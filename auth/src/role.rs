//! User roles and role claims.
//!
//! A user's role lives in the `role` custom claim of their identity token.
//! Claims are a flat JSON object; writes go through [`Claims::with_role`] so
//! that unrelated claims survive a role change.

use crate::error::AuthError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Name of the custom claim holding the role.
pub const ROLE_CLAIM: &str = "role";

/// Role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Tracks shipments addressed to them.
    Customer,
    /// Creates shipments and lists their own.
    Sender,
    /// Posts tracking checkpoints from a station.
    Station,
    /// Reassigns roles.
    Admin,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Self; 4] = [Self::Customer, Self::Sender, Self::Station, Self::Admin];

    /// Roles a user may pick for themselves. The rest are admin-granted.
    pub const SELF_ASSIGNABLE: [Self; 2] = [Self::Customer, Self::Sender];

    /// Wire form (`"CUSTOMER"`, `"SENDER"`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Sender => "SENDER",
            Self::Station => "STATION",
            Self::Admin => "ADMIN",
        }
    }

    /// Whether a user may assign this role to themselves.
    #[must_use]
    pub const fn is_self_assignable(self) -> bool {
        matches!(self, Self::Customer | Self::Sender)
    }

    /// Role carried by `claims`, or CUSTOMER when there is none.
    ///
    /// Backend-style consumers treat a roleless token as a customer. The
    /// client auth context does not; it reports the roleless state instead.
    #[must_use]
    pub fn from_claims_or_default(claims: &Claims) -> Self {
        claims.role().unwrap_or(Self::Customer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    /// Parses the exact wire form. Lowercase or padded input is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AuthError::invalid_argument(format!("Unknown role: {s:?}")))
    }
}

/// Custom claims attached to a user record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Empty claim set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The role claim, if present and recognised.
    ///
    /// An unknown role string counts as no role.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.0
            .get(ROLE_CLAIM)
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    /// Whether a `role` claim is set, recognised or not.
    ///
    /// `null`, `false`, `0` and `""` count as unset.
    #[must_use]
    pub fn has_role_claim(&self) -> bool {
        match self.0.get(ROLE_CLAIM) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(set)) => *set,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_) | Value::Object(_)) => true,
        }
    }

    /// Shallow merge: every existing claim is kept and `role` is replaced.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.0
            .insert(ROLE_CLAIM.to_string(), Value::String(role.as_str().to_string()));
        self
    }

    /// Set an arbitrary claim.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a claim by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no claims.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Parse claims stored as a JSON object string.
    ///
    /// An empty string is an empty claim set.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Provider`] if the string is not a JSON object.
    pub fn from_json_str(raw: &str) -> Result<Self, AuthError> {
        if raw.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str(raw)
            .map_err(|e| AuthError::Provider(format!("Malformed custom claims: {e}")))
    }

    /// Serialize to a JSON object string.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, AuthError> {
        serde_json::to_string(&self.0).map_err(|e| AuthError::Internal(e.to_string()))
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
