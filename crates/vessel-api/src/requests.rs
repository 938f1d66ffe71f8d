//! Request types for the API

use serde::{Deserialize, Serialize};

/// Body for renaming a named resource via POST on its URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

impl RenameRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize() {
        let request = RenameRequest::new("new-name");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"name": "new-name"})
        );
    }
}
