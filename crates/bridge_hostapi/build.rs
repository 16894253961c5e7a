//! Generates the host registration glue and embedded schema at build time
//! by running discovery over the built-in catalog.

use std::env;
use std::fs;
use std::path::PathBuf;

use bridge_codegen::{SchemaBuilder, discover, generate_host_glue};

mod catalog {
    include!("src/catalog.rs");
}

fn main() {
    println!("cargo::rerun-if-changed=src/catalog.rs");

    let (objects, warnings) = discover(&catalog::builtin_candidates());
    for warning in &warnings {
        println!("cargo::warning={}", warning);
    }

    let schema = SchemaBuilder::new(catalog::VERSION)
        .with_event_types(catalog::EVENT_TYPES.iter().copied())
        .with_objects(objects)
        .build();

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(
        out_dir.join("host_api_generated.rs"),
        generate_host_glue(&schema),
    )
    .expect("failed to write generated glue");
}
