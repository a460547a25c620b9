//! Inline JSON metadata carried in a strategy's metadata URI.

use serde::{Deserialize, Serialize};

const DATA_URI_PREFIX: &str = "data:application/json,";

/// Descriptive metadata published alongside a strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl StrategyMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// `data:application/json,<percent-encoded JSON>`
    pub fn to_uri(&self) -> String {
        let json = serde_json::json!({
            "name": self.name,
            "description": self.description,
        });
        format!("{DATA_URI_PREFIX}{}", urlencoding::encode(&json.to_string()))
    }

    /// Decode an inline JSON data URI. Any other URI scheme (ipfs://,
    /// https://, empty) yields `None`.
    pub fn from_uri(uri: &str) -> Option<Self> {
        let encoded = uri.strip_prefix(DATA_URI_PREFIX)?;
        let json = urlencoding::decode(encoded).ok()?;
        serde_json::from_str(&json).ok()
    }
}
