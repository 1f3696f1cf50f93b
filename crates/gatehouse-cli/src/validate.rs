//! # Validate Subcommand
//!
//! Runs one payload through the validation pipeline and prints the
//! Validation Outcome as pretty JSON. The payload is read from `--file`
//! (JSON, or YAML for `.yaml`/`.yml`) or from stdin.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use gatehouse_plugins::{PipelineConfig, ValidateOptions, ValidationPipeline};
use serde_json::Value;

use crate::load_registry;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Resource key, e.g. `Users` or `Users.Admin`.
    pub resource: String,

    /// Operation subtype, e.g. `signup`.
    #[arg(long = "type")]
    pub subtype: Option<String>,

    /// Payload file. Reads stdin when omitted.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Directory of declarative plugins merged over the built-ins.
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

/// Validate the payload and print the outcome. Returns whether it was valid.
pub fn run(args: &ValidateArgs, stdin: impl Read, out: &mut impl Write) -> anyhow::Result<bool> {
    let payload = match &args.file {
        Some(path) => read_payload_file(path)?,
        None => read_payload(stdin)?,
    };

    let registry = load_registry(args.dir.as_deref())?;
    let pipeline = ValidationPipeline::new(Arc::new(registry), PipelineConfig::default());
    let options = ValidateOptions {
        subtype: args.subtype.clone(),
    };
    let outcome = pipeline
        .validate(&args.resource, &payload, &options)
        .with_context(|| format!("validating against {}", args.resource))?;

    tracing::info!(
        resource = %args.resource,
        subtype = ?args.subtype,
        valid = outcome.is_valid,
        "payload validated"
    );

    serde_json::to_writer_pretty(&mut *out, &outcome)?;
    writeln!(out)?;
    Ok(outcome.is_valid)
}

fn read_payload(mut input: impl Read) -> anyhow::Result<Value> {
    let mut content = String::new();
    input
        .read_to_string(&mut content)
        .context("reading payload from stdin")?;
    serde_json::from_str(&content).context("payload is not valid JSON")
}

fn read_payload_file(path: &Path) -> anyhow::Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display())),
        _ => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(resource: &str, subtype: Option<&str>) -> ValidateArgs {
        ValidateArgs {
            resource: resource.to_string(),
            subtype: subtype.map(str::to_string),
            file: None,
            dir: None,
        }
    }

    #[test]
    fn valid_stdin_payload() {
        let input = r#"{ "email": "ana@example.com", "password": "secret123" }"#;
        let mut out = Vec::new();
        let valid = run(&args("Users", Some("login")), input.as_bytes(), &mut out).unwrap();
        assert!(valid);
        let outcome: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(outcome["validatedData"]["remember_me"], Value::Bool(false));
    }

    #[test]
    fn invalid_payload_returns_false() {
        let mut out = Vec::new();
        let valid = run(&args("Users", Some("login")), "{}".as_bytes(), &mut out).unwrap();
        assert!(!valid);
        let outcome: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(outcome["errorResponse"]["details"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn unknown_resource_is_an_error() {
        let err = run(&args("Orders", None), "{}".as_bytes(), &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("resource key not found"));
    }

    #[test]
    fn yaml_payload_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.yaml");
        fs::write(&path, "status: active\nis_blocked: \"false\"\n").unwrap();
        let mut a = args("Users", Some("update"));
        a.file = Some(path);
        let mut out = Vec::new();
        assert!(run(&a, std::io::empty(), &mut out).unwrap());
        let outcome: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(outcome["validatedData"]["is_blocked"], Value::Bool(false));
    }
}
