use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A route as listed by the upstream catalogue. The detail fetch keyed by
/// `id` supplies the actual path; `codigo` and `nome` are display fields
/// kept for the serialized artifacts.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RouteRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
