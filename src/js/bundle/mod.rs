// Bundle construction - concatenation, minification and derived artifacts

pub mod builder;
pub mod concat;
pub mod fallback;
pub mod paths;
pub mod source;

pub use builder::{BuildOutput, BundleBuilder};
pub use concat::{concatenate, Concatenation};
pub use paths::{map_path, transformed_path};
pub use source::{Bundle, Replacement, SourceFile, Transform};

use crate::js::config::BuildSettings;
use crate::js::error::PublishError;
use crate::js::registry::BundleTable;
use std::sync::Arc;

/// Build a bundle against `table` with the default minifier and sink
///
/// This is a convenience function for one-off builds.
pub fn build_bundle_content(
    table: Arc<BundleTable>,
    bundle: &Bundle,
    settings: &BuildSettings,
) -> Result<String, PublishError> {
    BundleBuilder::new(table).build_bundle_content(bundle, settings)
}
