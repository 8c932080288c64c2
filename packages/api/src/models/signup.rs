use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Keeps JSON strings; `null`, numbers and any other type read as `""`.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Body of `POST /v1/users/signup`.
///
/// A missing, `null` or non-string field reads as empty, so it is reported as
/// a validation error of that field rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub username: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub password: String,
    #[serde(deserialize_with = "lenient_string")]
    pub firstname: String,
    #[serde(deserialize_with = "lenient_string")]
    pub lastname: String,
    #[serde(deserialize_with = "lenient_string")]
    pub birthdate: String,
}

/// Body of a `201 Created` signup response.
///
/// `username` and `email` come from re-reading the account after it is
/// created; they are omitted if that read returns nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub person_id: String,
}

/// Body of `POST /v1/users/signin`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigninRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub username: String,
    #[serde(deserialize_with = "lenient_string")]
    pub password: String,
}
