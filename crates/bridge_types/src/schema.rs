//! Schema document
//!
//! The versioned, serializable description of every exposed capability, its
//! methods and signals, and the closed event-type vocabulary. The schema is
//! produced once by the offline generator and shared read-only by the host
//! and client runtimes for the session's lifetime.

use serde::{Deserialize, Serialize};

/// A single method or signal parameter.
///
/// The native type name is carried for diagnostics only; the client consumes
/// the pre-rendered `tsType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    /// Parameter name (positional `arg{i}` placeholder when undeclared)
    pub name: String,
    /// Declared native type name
    #[serde(rename = "type")]
    pub native_type: String,
    /// Mapped TypeScript type
    #[serde(rename = "tsType")]
    pub ts_type: String,
}

/// A callable method on a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptor {
    pub name: String,
    /// Declared native return type name (diagnostic only)
    pub return_type: String,
    /// Mapped TypeScript return type
    pub ts_return: String,
    pub returns_void: bool,
    pub params: Vec<ParamDescriptor>,
}

/// A one-way native-to-client notification scoped to one capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDescriptor {
    pub name: String,
    pub params: Vec<ParamDescriptor>,
}

/// One exposed native object: its exported name, methods, and signals.
///
/// Created once at schema-build time and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDescriptor {
    /// Exported name (explicit override or derived from the native name)
    pub name: String,
    /// Native type name (diagnostic only)
    pub native_name: String,
    pub methods: Vec<MethodDescriptor>,
    pub signals: Vec<SignalDescriptor>,
}

impl CapabilityDescriptor {
    /// Get a method by name.
    pub fn get_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Whether this capability declares a signal with the given name.
    pub fn has_signal(&self, name: &str) -> bool {
        self.signals.iter().any(|s| s.name == name)
    }
}

/// The complete bridge schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Protocol version string
    pub version: String,
    /// Closed list of allowed generic event-type names
    pub event_types: Vec<String>,
    /// Exposed capabilities, in registration order
    pub objects: Vec<CapabilityDescriptor>,
}

impl Schema {
    /// Parse a schema from its JSON text form.
    pub fn from_json_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serialize to compact JSON.
    pub fn to_json_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get a capability by exported name.
    pub fn get_object(&self, name: &str) -> Option<&CapabilityDescriptor> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Whether the given name is in the allowed event-type vocabulary.
    pub fn is_valid_event_type(&self, name: &str) -> bool {
        self.event_types.iter().any(|t| t == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        Schema {
            version: "0.1.0".to_string(),
            event_types: vec!["actionOne".to_string(), "actionTwo".to_string()],
            objects: vec![CapabilityDescriptor {
                name: "example".to_string(),
                native_name: "ExampleApi".to_string(),
                methods: vec![MethodDescriptor {
                    name: "echo".to_string(),
                    return_type: "String".to_string(),
                    ts_return: "string".to_string(),
                    returns_void: false,
                    params: vec![ParamDescriptor {
                        name: "text".to_string(),
                        native_type: "String".to_string(),
                        ts_type: "string".to_string(),
                    }],
                }],
                signals: vec![SignalDescriptor {
                    name: "statusChanged".to_string(),
                    params: vec![ParamDescriptor {
                        name: "status".to_string(),
                        native_type: "String".to_string(),
                        ts_type: "string".to_string(),
                    }],
                }],
            }],
        }
    }

    #[test]
    fn test_schema_json_field_names() {
        let json = serde_json::to_value(sample_schema()).unwrap();
        assert!(json.get("eventTypes").is_some());
        let object = &json["objects"][0];
        assert_eq!(object["nativeName"], "ExampleApi");
        let method = &object["methods"][0];
        assert_eq!(method["returnType"], "String");
        assert_eq!(method["tsReturn"], "string");
        assert_eq!(method["returnsVoid"], false);
        assert_eq!(method["params"][0]["type"], "String");
        assert_eq!(method["params"][0]["tsType"], "string");
    }

    #[test]
    fn test_schema_json_roundtrip() {
        let schema = sample_schema();
        let text = schema.to_json_text();
        let parsed = Schema::from_json_text(&text).unwrap();
        assert_eq!(schema, parsed);
    }

    #[test]
    fn test_lookup_helpers() {
        let schema = sample_schema();
        assert!(schema.is_valid_event_type("actionOne"));
        assert!(!schema.is_valid_event_type("bogus"));
        let example = schema.get_object("example").unwrap();
        assert!(example.get_method("echo").is_some());
        assert!(example.has_signal("statusChanged"));
        assert!(!example.has_signal("echo"));
    }

    #[test]
    fn test_malformed_schema_fails_to_parse() {
        assert!(Schema::from_json_text("not json").is_err());
    }
}
