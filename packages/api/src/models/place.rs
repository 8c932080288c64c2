use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A location returned by the geocoding provider.
///
/// Only the fields every provider result carries are typed; the rest of the
/// provider's object is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub place_id: Value,
    pub display_name: String,
    pub lat: String,
    pub lon: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
