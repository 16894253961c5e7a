//! Bridge Codegen
//!
//! Offline generation pipeline for the host capability bridge:
//! capability discovery over the static candidate catalog, schema assembly,
//! and emission of the generated artifacts (TypeScript definitions, Angular
//! service wrappers, package descriptor, Rust registration glue).
//!
//! Generation is deterministic: the same schema always produces
//! byte-identical output.

pub mod builder;
pub mod candidate;
pub mod emit;
pub mod output;
pub mod registry;

pub use builder::SchemaBuilder;
pub use candidate::{CapabilityCandidate, MemberDecl, MemberKind, ParamDecl};
pub use emit::{
    generate_host_glue, generate_package_json, generate_service_wrapper,
    generate_type_definitions,
};
pub use output::{GeneratorConfig, GeneratorError, write_artifacts};
pub use registry::{DiscoverWarning, discover};
