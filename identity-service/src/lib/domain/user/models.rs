use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::user::errors::EmailError;
use crate::user::errors::InvalidProviderError;
use crate::user::errors::InvalidRoleError;

/// User unique identifier, assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Granted authorization level. Two roles only; default is the least
/// privileged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = InvalidRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(InvalidRoleError(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin of an identity: local password account or federated assertion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Provider {
    #[default]
    Local,
    Federated,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Local => "LOCAL",
            Provider::Federated => "FEDERATED",
        }
    }
}

impl FromStr for Provider {
    type Err = InvalidProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOCAL" => Ok(Provider::Local),
            "FEDERATED" => Ok(Provider::Federated),
            other => Err(InvalidProviderError(other.to_string())),
        }
    }
}

/// Email address type
///
/// Validates format using an RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Whether a login identifier is email-shaped (as opposed to a
    /// username).
    pub fn is_email_shaped(identifier: &str) -> bool {
        email_address::EmailAddress::from_str(identifier).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// User identity record.
///
/// A local account is created disabled and carries a pending verification
/// token until email ownership is proven; a federated account is created
/// already enabled and has no password hash. Records are never hard-deleted
/// by this core.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: EmailAddress,
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub enabled: bool,
    pub role: Role,
    pub provider: Provider,
    /// Pending verification token; cleared once verification succeeds.
    pub verification_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user record not yet persisted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: EmailAddress,
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub enabled: bool,
    pub role: Role,
    pub provider: Provider,
    pub verification_token: Option<String>,
}

/// Command to register a local account.
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub username: String,
    pub email: EmailAddress,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Command to authenticate a local account. The identifier may be a
/// username or an email address.
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub identifier: String,
    pub password: String,
}

/// Provider-asserted identity tuple, consumed after the federated redirect
/// completes. The redirect mechanics live outside this core.
#[derive(Debug, Clone)]
pub struct FederatedIdentity {
    pub email: EmailAddress,
    pub first_name: String,
    pub last_name: String,
}

/// Admin command to change another user's role.
///
/// Exactly one identifying field must be provided; when both are given the
/// id takes precedence.
#[derive(Debug, Clone)]
pub struct RoleChange {
    pub user_id: Option<UserId>,
    pub email: Option<String>,
    pub role: Role,
}

/// Public identity attributes, safe to return to callers.
///
/// Never includes the password hash or the pending verification token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            username: user.username.clone(),
            email: user.email.as_str().to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Success payload of a coordinator operation.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    pub user: Option<UserSummary>,
    pub token: Option<String>,
    pub role: Option<Role>,
    pub message: String,
}

impl AuthOutcome {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            user: None,
            token: None,
            role: None,
            message: message.into(),
        }
    }
}
