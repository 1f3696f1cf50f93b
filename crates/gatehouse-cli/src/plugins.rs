//! # Plugins Subcommand
//!
//! Prints the loaded namespace:
//!
//! ```text
//! Users
//!   signup
//!   login
//!   update
//! Orders (empty)
//! rejected:
//!   Users/broken: invalid plugin structure ... (plugins/Users/broken.json)
//! ```

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crate::load_registry;

/// Arguments for the plugins subcommand.
#[derive(Args, Debug)]
pub struct PluginsArgs {
    /// Directory of declarative plugins merged over the built-ins.
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

/// Print the namespace tree to `out`.
pub fn run(args: &PluginsArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let registry = load_registry(args.dir.as_deref())?;

    for resource in registry.resources() {
        let subtypes = registry.subtypes(resource).unwrap_or_default();
        if subtypes.is_empty() {
            writeln!(out, "{resource} (empty)")?;
        } else {
            writeln!(out, "{resource}")?;
            for subtype in subtypes {
                writeln!(out, "  {subtype}")?;
            }
        }
    }

    if !registry.rejections().is_empty() {
        writeln!(out, "rejected:")?;
        for rejection in registry.rejections() {
            writeln!(
                out,
                "  {}/{}: {} ({})",
                rejection.resource, rejection.subtype, rejection.reason, rejection.origin
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_listed() {
        let mut out = Vec::new();
        run(&PluginsArgs { dir: None }, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Users\n  signup\n  login\n  update\n"
        );
    }

    #[test]
    fn directory_plugins_and_rejections_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Orders")).unwrap();
        std::fs::create_dir_all(dir.path().join("Audit")).unwrap();
        std::fs::write(
            dir.path().join("Orders/create.yaml"),
            "schema:\n  type: object\ndecorate: {}\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("Orders/broken.json"),
            r#"{ "schema": { "type": "object" } }"#,
        )
        .unwrap();

        let mut out = Vec::new();
        run(
            &PluginsArgs {
                dir: Some(dir.path().to_path_buf()),
            },
            &mut out,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Audit (empty)\n"), "got: {text}");
        assert!(text.contains("Orders\n  create\n"), "got: {text}");
        assert!(text.contains("rejected:\n  Orders/broken: "), "got: {text}");
        assert!(text.contains("missing decorate"), "got: {text}");
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = PluginsArgs {
            dir: Some(dir.path().join("missing")),
        };
        let err = run(&args, &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("loading plugins from"));
    }
}
