//! # Account projections and roles
//!
//! [`UserInfo`] is the client-safe view of an account: it drops the password
//! hash and converts ids to strings so it compiles for WASM without `uuid`.
//! The client derives its `isAuthenticated`/`isAdmin`/`isDoctor`/`isPatient`
//! flags from it.
//!
//! [`Role`] names are stored as plain text by the storage layer; unknown names
//! are skipped when projecting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Account information safe to send to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    pub person_id: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl UserInfo {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Body of `PUT /v1/users/{id}/roles`. Replaces the account's roles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolesRequest {
    pub roles: Vec<Role>,
}

#[cfg(feature = "server")]
impl From<&store::Account> for UserInfo {
    fn from(account: &store::Account) -> Self {
        UserInfo {
            id: account.id.to_string(),
            username: account.username.clone(),
            email: account.email.clone(),
            person_id: account.attributes.person_id.map(|id| id.to_string()),
            roles: account
                .roles
                .iter()
                .filter_map(|r| r.parse().ok())
                .collect(),
        }
    }
}
