use serde::{Deserialize, Serialize};

/// Body returned by a route once every guard let the request through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub route: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    pub message: String,
}
