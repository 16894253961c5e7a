//! Schema Builder
//!
//! Assembles the versioned schema document from discovered capability
//! descriptors plus the fixed event-type vocabulary.

use bridge_types::schema::{CapabilityDescriptor, Schema};

/// Builder for the bridge schema.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    version: String,
    event_types: Vec<String>,
    objects: Vec<CapabilityDescriptor>,
}

impl SchemaBuilder {
    /// Start a schema for the given protocol version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            event_types: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Set the closed list of allowed generic event types, in order.
    pub fn with_event_types<I, S>(mut self, event_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_types = event_types.into_iter().map(Into::into).collect();
        self
    }

    /// Set the capability descriptors, in catalog order.
    pub fn with_objects(mut self, objects: Vec<CapabilityDescriptor>) -> Self {
        self.objects = objects;
        self
    }

    /// Assemble the schema.
    pub fn build(self) -> Schema {
        Schema {
            version: self.version,
            event_types: self.event_types,
            objects: self.objects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::CapabilityCandidate;
    use crate::registry::discover;

    #[test]
    fn test_build_schema() {
        let (objects, _) = discover(&[CapabilityCandidate::new("ExampleApi")
            .exposed()
            .method("echo", &[("text", "String")], "String")]);

        let schema = SchemaBuilder::new("0.1.0")
            .with_event_types(["actionOne", "actionTwo"])
            .with_objects(objects)
            .build();

        assert_eq!(schema.version, "0.1.0");
        assert_eq!(schema.event_types, vec!["actionOne", "actionTwo"]);
        assert_eq!(schema.objects.len(), 1);
        assert_eq!(schema.objects[0].name, "example");
    }
}
