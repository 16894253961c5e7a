//! Host API crate
//!
//! Ties the pieces together for an embedding application: the built-in
//! capability catalog, the capability implementations, and the glue module
//! generated at build time (embedded schema plus registration function).
//!
//! The candidate store is initialized once from the built-in catalog;
//! additional candidates can be installed at runtime and cleared again,
//! which regeneration-style tests rely on.

pub mod catalog;
pub mod example;

use bridge_codegen::CapabilityCandidate;
use parking_lot::RwLock;

pub use example::ExampleApi;

/// Build-time generated registration glue and embedded schema.
pub mod generated {
    include!(concat!(env!("OUT_DIR"), "/host_api_generated.rs"));
}

pub use generated::{HOST_API_SCHEMA_JSON, host_api_schema, register_host_api_capabilities};

static EXTRA_CANDIDATES: RwLock<Vec<CapabilityCandidate>> = RwLock::new(Vec::new());

/// Every candidate generation currently sees: the built-in table plus any
/// installed additions, in installation order.
pub fn active_candidates() -> Vec<CapabilityCandidate> {
    let mut all = catalog::builtin_candidates();
    all.extend(EXTRA_CANDIDATES.read().iter().cloned());
    all
}

/// Install an additional candidate after startup.
pub fn install_candidate(candidate: CapabilityCandidate) {
    EXTRA_CANDIDATES.write().push(candidate);
}

/// Drop every installed candidate, leaving only the built-in table.
/// Primarily for tests that install throwaway candidates.
pub fn reset_candidates() {
    EXTRA_CANDIDATES.write().clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_schema_matches_catalog() {
        let schema = host_api_schema();
        assert_eq!(schema.version, catalog::VERSION);
        assert_eq!(schema.event_types, catalog::EVENT_TYPES);

        let example = schema.get_object("example").unwrap();
        assert_eq!(example.native_name, "ExampleApi");
        assert_eq!(example.methods.len(), 3);
        assert!(example.has_signal("statusChanged"));

        let set_status = example.get_method("setStatus").unwrap();
        assert!(set_status.returns_void);
        let add = example.get_method("add").unwrap();
        assert_eq!(add.ts_return, "number");
    }

    #[test]
    fn test_candidate_store_installs_and_resets() {
        reset_candidates();
        let builtin = active_candidates().len();

        install_candidate(
            CapabilityCandidate::new("ScratchApi")
                .exposed()
                .method("ping", &[], "()"),
        );
        assert_eq!(active_candidates().len(), builtin + 1);

        reset_candidates();
        assert_eq!(active_candidates().len(), builtin);
    }
}
