// Built-in capability catalog: the static candidate table generation runs
// over. This file is included by the build script as well as the library,
// so it must only reference `bridge_codegen` and `bridge_types` items.

use bridge_codegen::CapabilityCandidate;

/// Bridge protocol version advertised to clients.
pub const VERSION: &str = "0.1.0";

/// Closed vocabulary of generic event types.
pub const EVENT_TYPES: &[&str] = &["actionOne", "actionTwo"];

/// Candidate declarations for every built-in capability.
pub fn builtin_candidates() -> Vec<CapabilityCandidate> {
    vec![
        CapabilityCandidate::new("ExampleApi")
            .exposed()
            .method("echo", &[("text", "String")], "String")
            .method("add", &[("a", "i64"), ("b", "i64")], "i64")
            .method("setStatus", &[("status", "String")], "()")
            .signal("statusChanged", &[("status", "String")]),
    ]
}
