//! Persisted records.
//!
//! [`Person`] and [`Account`] are independent top-level records. They point at
//! each other by id only (`Person::user_id` and `AccountAttributes::person_id`),
//! so nothing below this layer keeps the two sides consistent.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Demographic record, independent of login credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub birthdate: NaiveDate,
    /// Unset until the owning account has been created and linked.
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a [`Person`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewPerson {
    pub firstname: String,
    pub lastname: String,
    pub birthdate: NaiveDate,
}

/// Free-form attribute bag carried by an account.
///
/// `personId` is the only key the server interprets; anything else is kept
/// verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<Uuid>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AccountAttributes {
    pub fn for_person(person_id: Uuid) -> Self {
        Self {
            person_id: Some(person_id),
            extra: Map::new(),
        }
    }
}

/// Credential-bearing record.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// PHC-format hash, never the plaintext.
    pub password_hash: String,
    pub attributes: AccountAttributes,
    /// Role names as stored (`"admin"`, `"doctor"`, `"patient"`).
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create an [`Account`]. The password must already be hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub attributes: AccountAttributes,
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attributes_serialize_person_id_camel_case() {
        let id = Uuid::new_v4();
        let attrs = AccountAttributes::for_person(id);
        let value = serde_json::to_value(&attrs).unwrap();
        assert_eq!(value, json!({ "personId": id.to_string() }));
    }

    #[test]
    fn test_attributes_keep_unknown_keys() {
        let attrs: AccountAttributes =
            serde_json::from_value(json!({ "personId": null, "clinic": "north" })).unwrap();
        assert!(attrs.person_id.is_none());
        assert_eq!(attrs.extra.get("clinic"), Some(&json!("north")));
    }
}
