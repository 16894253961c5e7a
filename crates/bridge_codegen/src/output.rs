//! Artifact writer
//!
//! Lays generated sources out on disk. The distributable package under
//! `npm/` carries its own copies of the type definitions and services so it
//! can be published without reaching back into the build tree.

use std::fs;
use std::path::{Path, PathBuf};

use bridge_types::schema::Schema;
use tracing::info;

use crate::emit::{
    generate_host_glue, generate_package_json, generate_service_wrapper,
    generate_type_definitions, to_pascal_case,
};

/// Where artifacts land and what the published package is called.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub output_dir: PathBuf,
    pub package_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn ensure_dir(path: &Path) -> Result<(), GeneratorError> {
    fs::create_dir_all(path).map_err(|source| GeneratorError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<PathBuf, GeneratorError> {
    fs::write(path, contents).map_err(|source| GeneratorError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(path.to_path_buf())
}

/// Generate every artifact for `schema` and write the full output tree.
/// Returns the paths written, in a stable order.
pub fn write_artifacts(
    schema: &Schema,
    config: &GeneratorConfig,
) -> Result<Vec<PathBuf>, GeneratorError> {
    let out = &config.output_dir;
    let angular_dir = out.join("angular");
    let npm_dir = out.join("npm");
    let npm_angular_dir = npm_dir.join("angular");
    ensure_dir(out)?;
    ensure_dir(&angular_dir)?;
    ensure_dir(&npm_dir)?;
    ensure_dir(&npm_angular_dir)?;

    let mut written = Vec::new();

    written.push(write_file(
        &out.join("host_api_generated.rs"),
        &generate_host_glue(schema),
    )?);

    let schema_json = serde_json::to_string_pretty(schema)
        .map_err(|source| GeneratorError::Write {
            path: out.join("hostapi_schema.json"),
            source: std::io::Error::other(source),
        })?;
    written.push(write_file(
        &out.join("hostapi_schema.json"),
        &format!("{}\n", schema_json),
    )?);

    let dts = generate_type_definitions(schema);
    written.push(write_file(&out.join("hostapi.d.ts"), &dts)?);
    written.push(write_file(&npm_dir.join("hostapi.d.ts"), &dts)?);

    for object in &schema.objects {
        let file_name = format!("{}Service.ts", to_pascal_case(&object.name));
        let wrapper = generate_service_wrapper(object);
        written.push(write_file(&angular_dir.join(&file_name), &wrapper)?);
        written.push(write_file(&npm_angular_dir.join(&file_name), &wrapper)?);
    }

    written.push(write_file(
        &npm_dir.join("package.json"),
        &generate_package_json(&config.package_name, &schema.version),
    )?);

    info!(
        output_dir = %out.display(),
        files = written.len(),
        "wrote generated artifacts"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SchemaBuilder;
    use crate::candidate::CapabilityCandidate;
    use crate::registry::discover;

    fn example_schema() -> Schema {
        let (objects, _) = discover(&[CapabilityCandidate::new("ExampleApi")
            .exposed()
            .method("echo", &[("text", "String")], "String")
            .signal("statusChanged", &[("status", "String")])]);
        SchemaBuilder::new("0.1.0")
            .with_event_types(["actionOne", "actionTwo"])
            .with_objects(objects)
            .build()
    }

    #[test]
    fn test_write_artifacts_layout() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            output_dir: dir.path().to_path_buf(),
            package_name: "@hostbridge/api".to_string(),
        };
        let written = write_artifacts(&example_schema(), &config).unwrap();

        for expected in [
            "host_api_generated.rs",
            "hostapi_schema.json",
            "hostapi.d.ts",
            "npm/hostapi.d.ts",
            "angular/ExampleService.ts",
            "npm/angular/ExampleService.ts",
            "npm/package.json",
        ] {
            let path = dir.path().join(expected);
            assert!(path.is_file(), "missing artifact {}", expected);
            assert!(written.contains(&path));
        }

        let dts = std::fs::read_to_string(dir.path().join("hostapi.d.ts")).unwrap();
        let npm_dts = std::fs::read_to_string(dir.path().join("npm/hostapi.d.ts")).unwrap();
        assert_eq!(dts, npm_dts);
    }

    #[test]
    fn test_uncreatable_output_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        // A regular file in the path makes directory creation impossible.
        let config = GeneratorConfig {
            output_dir: blocker.join("out"),
            package_name: "@hostbridge/api".to_string(),
        };
        let error = write_artifacts(&example_schema(), &config).unwrap_err();
        assert!(matches!(error, GeneratorError::CreateDir { .. }));
    }

    #[test]
    fn test_schema_json_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            output_dir: dir.path().to_path_buf(),
            package_name: "@hostbridge/api".to_string(),
        };
        write_artifacts(&example_schema(), &config).unwrap();

        let text = std::fs::read_to_string(dir.path().join("hostapi_schema.json")).unwrap();
        let parsed = Schema::from_json_text(&text).unwrap();
        assert_eq!(parsed.version, "0.1.0");
        assert_eq!(parsed.objects.len(), 1);
        assert_eq!(parsed.objects[0].name, "example");
    }
}
