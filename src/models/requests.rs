//! Request DTOs for the front-end API
//!
//! Defines the structure of incoming query strings.

use serde::Deserialize;

/// Query string of the lookup operation (GET /api)
///
/// # Fields
/// - `group`: Group to look in (the server's default group if omitted)
/// - `key`: The key to look up
#[derive(Debug, Clone, Deserialize)]
pub struct LookupQuery {
    /// Target group
    #[serde(default)]
    pub group: Option<String>,
    /// The key to look up
    #[serde(default)]
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_query_deserialize() {
        let json = r#"{"group": "scores", "key": "Tom"}"#;
        let query: LookupQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.group.as_deref(), Some("scores"));
        assert_eq!(query.key, "Tom");
    }

    #[test]
    fn test_lookup_query_defaults() {
        let query: LookupQuery = serde_json::from_str("{}").unwrap();
        assert!(query.group.is_none());
        assert_eq!(query.key, "");
    }
}
