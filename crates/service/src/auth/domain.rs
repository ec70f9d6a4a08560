use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AuthError;

/// Account role. Fixed when the user is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            other => Err(AuthError::Repository(format!("unknown role in store: {other}"))),
        }
    }
}

/// Canonical identity key: trimmed and lowercased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Signup input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub enrollment: Option<String>,
    #[serde(default)]
    pub admin_code: Option<String>,
}

/// Password login input. Carries no role: the stored one is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Google login input (an ID token from Google Identity Services)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleLoginInput {
    pub token: String,
}

/// Stored user (business view)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: Role,
    pub enrollment: String,
    pub admin_code: String,
}

impl UserRecord {
    /// Stored hash, if the account can log in with a password.
    /// Legacy federated rows stored an empty string instead of nothing.
    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref().filter(|h| !h.is_empty())
    }

    pub fn profile(&self) -> AuthProfile {
        AuthProfile { name: self.name.clone(), email: self.email.clone(), role: self.role }
    }
}

/// User to be persisted. `email` is already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: Role,
    pub enrollment: String,
    pub admin_code: String,
}

/// What a successful signup/login reports back. Never includes the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthProfile {
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Name/email projection used by listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
}
