//! JSON Schema for the configuration file.

use crate::config::AgentConfig;

/// Generates a JSON Schema for the agent configuration.
///
/// The schema includes all configuration options with their types,
/// descriptions, and default values.
#[must_use]
pub fn generate_schema() -> schemars::Schema { schemars::schema_for!(AgentConfig) }

/// Generates a pretty-printed JSON Schema string.
#[must_use]
pub fn generate_schema_json() -> String {
    let schema = generate_schema();
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_schema_produces_valid_json() {
        let schema_json = generate_schema_json();
        let parsed: serde_json::Value = serde_json::from_str(&schema_json).unwrap();

        assert_eq!(parsed["$schema"], "https://json-schema.org/draft/2020-12/schema");
        assert_eq!(parsed["title"], "AgentConfig");
        assert!(parsed["properties"]["watchDirectory"].is_object());
        assert!(parsed["properties"]["gateVariant"].is_object());
        assert!(parsed["properties"]["lockScreen"].is_object());
    }

    #[test]
    fn test_schema_skips_internal_fields() {
        let parsed: serde_json::Value = serde_json::from_str(&generate_schema_json()).unwrap();
        assert!(parsed["properties"].get("baseDir").is_none());
    }

    #[test]
    fn test_schema_lists_enum_values() {
        let schema_json = generate_schema_json();
        assert!(schema_json.contains("nestedBands"));
        assert!(schema_json.contains("lockAware"));
        assert!(schema_json.contains("fullRescan"));
    }
}
