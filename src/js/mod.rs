// Script bundle pipeline: concatenate, minify, source-map and publish derived artifacts

pub mod bundle;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod manifest;
pub mod minify;
pub mod registry;
pub mod remap;

pub use bundle::{Bundle, BuildOutput, BundleBuilder, Replacement, SourceFile, Transform};
pub use config::BuildSettings;
pub use diagnostics::{DiagnosticSink, FaultRecord, TracingSink};
pub use error::{ManifestError, PublishError, SourceMapError};
pub use registry::{Binding, BundleTable, PublishAction, ResourceKind};
