// Bundle builder - concatenate, minify, publish the map, fall back on failure

use super::concat::{concatenate, concatenate_raw};
use super::fallback::{diagnostics_fallback, fault_fallback};
use super::paths::map_path;
use super::source::Bundle;
use crate::js::config::BuildSettings;
use crate::js::diagnostics::{BuildStage, DiagnosticSink, FaultRecord, TracingSink};
use crate::js::error::PublishError;
use crate::js::minify::{
    MinifyOptions, MinifyOutcome, OxcMinifier, ScriptMinifier, SourceMapSession,
};
use crate::js::registry::BundleTable;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Content produced for a bundle, tagged with how it was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutput {
    /// Minified text; its map was published at `map_path`
    Minified { content: String, map_path: String },

    /// The minifier rejected the input; content is the commented concatenation
    Unminified {
        content: String,
        diagnostics: Vec<String>,
    },

    /// An unexpected fault; content carries only a generic notice
    Fault { content: String, record: FaultRecord },
}

impl BuildOutput {
    /// Text to serve for the bundle
    pub fn content(&self) -> &str {
        match self {
            BuildOutput::Minified { content, .. }
            | BuildOutput::Unminified { content, .. }
            | BuildOutput::Fault { content, .. } => content,
        }
    }

    pub fn into_content(self) -> String {
        match self {
            BuildOutput::Minified { content, .. }
            | BuildOutput::Unminified { content, .. }
            | BuildOutput::Fault { content, .. } => content,
        }
    }

    pub fn is_minified(&self) -> bool {
        matches!(self, BuildOutput::Minified { .. })
    }
}

/// Builds bundle content and publishes its derived artifacts
///
/// Only a registry collision escapes `build` as an error. Minifier
/// diagnostics, faults and panics all produce servable fallback content.
#[derive(Clone)]
pub struct BundleBuilder {
    table: Arc<BundleTable>,
    minifier: Arc<dyn ScriptMinifier>,
    sink: Arc<dyn DiagnosticSink>,
}

impl BundleBuilder {
    /// Builder using the OXC minifier and logging faults through tracing
    pub fn new(table: Arc<BundleTable>) -> Self {
        Self {
            table,
            minifier: Arc::new(OxcMinifier),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_minifier(mut self, minifier: Arc<dyn ScriptMinifier>) -> Self {
        self.minifier = minifier;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Table derived artifacts are published into
    pub fn table(&self) -> &Arc<BundleTable> {
        &self.table
    }

    /// Build the servable content of `bundle`
    pub fn build_bundle_content(
        &self,
        bundle: &Bundle,
        settings: &BuildSettings,
    ) -> Result<String, PublishError> {
        self.build(bundle, settings).map(BuildOutput::into_content)
    }

    /// Build `bundle`, reporting how the content was produced
    pub fn build(
        &self,
        bundle: &Bundle,
        settings: &BuildSettings,
    ) -> Result<BuildOutput, PublishError> {
        tracing::debug!(
            bundle = %bundle.path,
            files = bundle.files.len(),
            minify = settings.minify_code,
            "Building bundle"
        );

        let stage = Cell::new(BuildStage::Concatenate);
        let mut concatenated: Option<String> = None;

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run(bundle, settings, &stage, &mut concatenated)
        }));

        let record = match result {
            Ok(Ok(output)) => {
                tracing::debug!(bundle = %bundle.path, minified = output.is_minified(), "Bundle built");
                return Ok(output);
            }
            Ok(Err(err)) => match err.downcast::<PublishError>() {
                Ok(collision) => {
                    tracing::error!(bundle = %bundle.path, error = %collision, "Artifact path collision");
                    return Err(collision);
                }
                Err(err) => FaultRecord::from_error(&bundle.path, stage.get(), &err),
            },
            Err(payload) => FaultRecord::from_panic(&bundle.path, stage.get(), payload.as_ref()),
        };

        self.sink.report(&record);
        let text = concatenated.unwrap_or_else(|| concatenate_raw(&bundle.files));
        Ok(BuildOutput::Fault {
            content: fault_fallback(&text),
            record,
        })
    }

    fn run(
        &self,
        bundle: &Bundle,
        settings: &BuildSettings,
        stage: &Cell<BuildStage>,
        concatenated: &mut Option<String>,
    ) -> anyhow::Result<BuildOutput> {
        stage.set(BuildStage::Concatenate);
        let concatenation = concatenate(&bundle.files, &self.table)?;
        let text: &str = concatenated.insert(concatenation.text);

        stage.set(BuildStage::Minify);
        let map_path = map_path(&bundle.path);
        let mut session = SourceMapSession::new(&bundle.path, &map_path);
        session.add_source_origins(&concatenation.origins);
        let options = MinifyOptions::from_settings(settings);

        let code = match self.minifier.minify(text, &options, &mut session)? {
            MinifyOutcome::Minified { code } => code,
            MinifyOutcome::Diagnostics(diagnostics) => {
                tracing::warn!(
                    bundle = %bundle.path,
                    errors = diagnostics.len(),
                    "Minification failed, serving concatenated content unminified"
                );
                return Ok(BuildOutput::Unminified {
                    content: diagnostics_fallback(&diagnostics, text),
                    diagnostics,
                });
            }
        };

        stage.set(BuildStage::SourceMap);
        let mapping_comment = session.mapping_comment();
        let map = session.flush()?;

        stage.set(BuildStage::Publish);
        self.table.publish(&map_path, &map)?;

        let mut content = code;
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&mapping_comment);

        Ok(BuildOutput::Minified { content, map_path })
    }
}
