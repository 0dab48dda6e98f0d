//! Wire payloads of the print service.

use serde::{Deserialize, Serialize};

/// Answer of the print endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintResult {
    /// Whether the mock-up was rendered.
    pub success: bool,
    /// Dataset the mock-up was rendered with.
    #[serde(default)]
    pub dataset_name: String,
    /// Model gender used for the mock-up.
    #[serde(default)]
    pub gender: String,
    /// URL of the rendered mock-up image.
    #[serde(default)]
    pub image_url: String,
}

/// Payload of the health endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Service status string.
    #[serde(default)]
    pub status: Option<String>,
    /// Service version.
    #[serde(default)]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_result_wire_names() {
        let json = r#"{"success":true,"dataset_name":"data1","gender":"male","image_url":"https://x/y.jpg"}"#;
        let result: PrintResult = serde_json::from_str(json).expect("decode");
        assert!(result.success);
        assert_eq!(result.image_url, "https://x/y.jpg");
    }

    #[test]
    fn test_failed_print_may_omit_fields() {
        let result: PrintResult = serde_json::from_str(r#"{"success":false}"#).expect("decode");
        assert!(!result.success);
        assert!(result.image_url.is_empty());
    }
}
