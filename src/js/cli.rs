// CLI commands for building bundles and remapping stack traces

use crate::js::{
    bundle::{BuildOutput, BundleBuilder},
    manifest::BundleManifest,
    registry::BundleTable,
    remap::StackRemapper,
};
use anyhow::{Context, Result};
use clap::Subcommand;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Bundle subcommands
#[derive(Subcommand, Debug)]
pub enum BundleCommands {
    /// Build a bundle from a manifest and write it with its derived artifacts
    Build {
        /// Path to bundle.toml
        manifest: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "dist")]
        out: PathBuf,
    },

    /// Remap a minified stack trace to original file positions
    Remap {
        /// Published source map file
        #[arg(short, long)]
        map: PathBuf,

        /// Stack trace file (default: stdin)
        #[arg(short, long)]
        stack: Option<PathBuf>,
    },
}

impl BundleCommands {
    /// Execute the command
    pub fn run(self) -> Result<()> {
        match self {
            BundleCommands::Build { manifest, out } => Self::build_cmd(&manifest, &out),
            BundleCommands::Remap { map, stack } => Self::remap_cmd(&map, stack.as_deref()),
        }
    }

    fn build_cmd(manifest_path: &Path, out: &Path) -> Result<()> {
        let (bundle, settings) = BundleManifest::load(manifest_path)?.into_bundle()?;
        let table = Arc::new(BundleTable::new());
        let builder = BundleBuilder::new(table.clone());

        let output = builder.build(&bundle, &settings)?;
        match &output {
            BuildOutput::Minified { map_path, .. } => {
                println!("✅ Built {} (map: {})", bundle.path, map_path);
            }
            BuildOutput::Unminified { diagnostics, .. } => {
                println!(
                    "⚠️  Built {} unminified: {} minifier error(s)",
                    bundle.path,
                    diagnostics.len()
                );
                for message in diagnostics {
                    println!("   {}", message);
                }
            }
            BuildOutput::Fault { .. } => {
                println!(
                    "⚠️  Built {} with fallback content, see the log for details",
                    bundle.path
                );
            }
        }

        std::fs::create_dir_all(out)
            .with_context(|| format!("Failed to create {}", out.display()))?;
        write_artifact(out, &bundle.path, output.content())?;
        for (path, content) in table.artifacts() {
            write_artifact(out, &path, &content)?;
        }
        Ok(())
    }

    fn remap_cmd(map: &Path, stack: Option<&Path>) -> Result<()> {
        let map_json = std::fs::read_to_string(map)
            .with_context(|| format!("Failed to read {}", map.display()))?;

        let raw = match stack {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };

        let key = map.display().to_string();
        let mut remapper = StackRemapper::new();
        if !remapper.register(&key, &map_json) {
            anyhow::bail!("{} is not a valid source map", map.display());
        }
        println!("{}", remapper.remap_stack(&key, &raw));
        Ok(())
    }
}

/// Write `content` to `out/<virtual_path>`, mirroring the virtual directories
fn write_artifact(out: &Path, virtual_path: &str, content: &str) -> Result<()> {
    let relative = relative_target(virtual_path)
        .with_context(|| format!("Virtual path '{}' cannot be written to disk", virtual_path))?;
    let target = out.join(relative);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&target, content)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    tracing::info!(path = %virtual_path, file = %target.display(), "Wrote artifact");
    Ok(())
}

/// Relative on-disk path for a virtual path; `None` if it would escape `out`
fn relative_target(virtual_path: &str) -> Option<PathBuf> {
    let trimmed = virtual_path
        .strip_prefix("~/")
        .unwrap_or(virtual_path)
        .trim_start_matches('/');
    if trimmed.is_empty() || trimmed.ends_with('/') {
        return None;
    }

    let mut relative = PathBuf::new();
    for segment in trimmed.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
            return None;
        }
        relative.push(segment);
    }
    Some(relative)
}
