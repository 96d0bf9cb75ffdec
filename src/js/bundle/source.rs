// Bundle and source file types

use anyhow::{Context, Result};
use std::fmt;
use std::sync::Arc;

/// Rewrite applied to a single file before it enters a bundle
///
/// Transforms are opaque to the pipeline: it only needs how many there are
/// and the text they produce.
pub trait Transform: Send + Sync {
    /// Short name used in error context
    fn name(&self) -> &str;

    fn process(&self, path: &str, input: &str) -> Result<String>;
}

/// Transform whose output was computed ahead of time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    output: String,
}

impl Replacement {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

impl Transform for Replacement {
    fn name(&self) -> &str {
        "replacement"
    }

    fn process(&self, _path: &str, _input: &str) -> Result<String> {
        Ok(self.output.clone())
    }
}

/// One constituent file of a bundle
#[derive(Clone)]
pub struct SourceFile {
    /// Virtual path of the file
    pub path: String,

    /// Raw, untransformed content
    pub content: String,

    transforms: Vec<Arc<dyn Transform>>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            transforms: Vec::new(),
        }
    }

    /// Append a transform to run after the ones already registered
    pub fn with_transform(mut self, transform: Arc<dyn Transform>) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn transform_count(&self) -> usize {
        self.transforms.len()
    }

    /// Run every transform in order over the raw content
    pub fn apply_transforms(&self) -> Result<String> {
        let mut text = self.content.clone();
        for transform in &self.transforms {
            text = transform.process(&self.path, &text).with_context(|| {
                format!(
                    "Transform '{}' failed for '{}'",
                    transform.name(),
                    self.path
                )
            })?;
        }
        Ok(text)
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("content_len", &self.content.len())
            .field(
                "transforms",
                &self.transforms.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Named, ordered collection of files built into one servable script
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Virtual path the bundle is served from
    pub path: String,

    pub files: Vec<SourceFile>,
}

impl Bundle {
    pub fn new(path: impl Into<String>, files: Vec<SourceFile>) -> Self {
        Self {
            path: path.into(),
            files,
        }
    }
}
