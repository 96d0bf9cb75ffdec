// Operator-facing diagnostics for bundle build faults
//
// Fault details never reach served content; they are handed to a
// DiagnosticSink instead. The default sink writes them to tracing.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

/// Pipeline stage a fault originated in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Concatenate,
    Minify,
    SourceMap,
    Publish,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuildStage::Concatenate => "concatenate",
            BuildStage::Minify => "minify",
            BuildStage::SourceMap => "source-map",
            BuildStage::Publish => "publish",
        })
    }
}

/// Structured record of an unexpected build fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultRecord {
    /// Virtual path of the bundle being built
    pub bundle: String,

    /// Primary failure message
    pub message: String,

    /// Nested failure message, if the fault wraps another error
    pub cause: Option<String>,

    /// Module and stage that produced the fault
    pub origin: String,

    pub stack_trace: String,
}

impl FaultRecord {
    /// Build a record from an error returned by the pipeline
    pub fn from_error(bundle: &str, stage: BuildStage, err: &anyhow::Error) -> Self {
        let backtrace = err.backtrace();
        let stack_trace = if backtrace.status() == BacktraceStatus::Captured {
            backtrace.to_string()
        } else {
            Backtrace::force_capture().to_string()
        };

        Self {
            bundle: bundle.to_string(),
            message: err.to_string(),
            cause: err.chain().nth(1).map(|cause| cause.to_string()),
            origin: origin(stage),
            stack_trace,
        }
    }

    /// Build a record from a caught panic payload
    pub fn from_panic(bundle: &str, stage: BuildStage, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());

        Self {
            bundle: bundle.to_string(),
            message: format!("panic: {}", message),
            cause: None,
            origin: origin(stage),
            stack_trace: Backtrace::force_capture().to_string(),
        }
    }
}

fn origin(stage: BuildStage) -> String {
    format!("{}::bundle::{}", env!("CARGO_PKG_NAME"), stage)
}

/// Receiver of fault records
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, record: &FaultRecord);
}

/// Sink that logs fault records as structured `tracing` errors
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, record: &FaultRecord) {
        tracing::error!(
            bundle = %record.bundle,
            origin = %record.origin,
            cause = record.cause.as_deref().unwrap_or("<none>"),
            stack_trace = %record.stack_trace,
            "Bundle build failed: {}",
            record.message
        );
    }
}
