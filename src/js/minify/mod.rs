// Script minification using OXC, with positional mappings fed to a SourceMapSession

pub mod session;

pub use session::{SourceMapSession, SourceOrigin};

use crate::js::config::BuildSettings;
use anyhow::{anyhow, Context, Result};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions, CommentOptions, LegalComment};
use oxc_minifier::{CompressOptions, MangleOptions, Minifier, MinifierOptions};
use oxc_ast::ast::Program;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use std::path::PathBuf;

/// Options handed to a minifier for one build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinifyOptions {
    /// Compress, mangle and strip whitespace
    pub minify_code: bool,

    /// Keep legal comments (`/*!`, `@license`, `@preserve`)
    pub preserve_important_comments: bool,

    safe_eval: bool,
}

impl MinifyOptions {
    /// Derive minifier options from build settings
    ///
    /// Safe eval handling is always on.
    pub fn from_settings(settings: &BuildSettings) -> Self {
        Self {
            minify_code: settings.minify_code,
            preserve_important_comments: settings.preserve_important_comments,
            safe_eval: true,
        }
    }

    /// Code reachable from a direct `eval` keeps its binding names
    pub fn safe_eval(&self) -> bool {
        self.safe_eval
    }
}

/// Result of a minification attempt that did not fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinifyOutcome {
    /// Output text; mappings were recorded into the session
    Minified { code: String },

    /// The input could not be minified; one message per problem
    Diagnostics(Vec<String>),
}

/// Capability to minify script text while reporting mappings
///
/// Recoverable input problems are returned as `MinifyOutcome::Diagnostics`.
/// `Err` is reserved for unexpected faults.
pub trait ScriptMinifier: Send + Sync {
    fn minify(
        &self,
        source: &str,
        options: &MinifyOptions,
        session: &mut SourceMapSession,
    ) -> Result<MinifyOutcome>;
}

/// OXC-based minifier
///
/// Parses the input as a classic (non-module) script, optionally compresses
/// and mangles it, and regenerates code with a source map.
#[derive(Debug, Default, Clone, Copy)]
pub struct OxcMinifier;

impl ScriptMinifier for OxcMinifier {
    fn minify(
        &self,
        source: &str,
        options: &MinifyOptions,
        session: &mut SourceMapSession,
    ) -> Result<MinifyOutcome> {
        let allocator = Allocator::default();
        let source_type = SourceType::script();

        let parsed = Parser::new(&allocator, source, source_type).parse();
        if !parsed.errors.is_empty() {
            let messages = parsed.errors.iter().map(|e| e.to_string()).collect();
            return Ok(MinifyOutcome::Diagnostics(messages));
        }
        if parsed.panicked {
            return Ok(MinifyOutcome::Diagnostics(vec![
                "Parser aborted before reaching the end of input".to_string(),
            ]));
        }
        let mut program = parsed.program;

        let scoping = if options.minify_code {
            let keep_names = options.safe_eval() && contains_direct_eval(&program);
            if keep_names {
                tracing::debug!(
                    bundle = %session.generated_path(),
                    "Direct eval found, identifier mangling disabled"
                );
            }
            let minifier_options = MinifierOptions {
                mangle: (!keep_names).then(MangleOptions::default),
                compress: Some(CompressOptions::smallest()),
            };
            Minifier::new(minifier_options)
                .minify(&allocator, &mut program)
                .scoping
        } else {
            None
        };

        let generated = Codegen::new()
            .with_options(CodegenOptions {
                minify: options.minify_code,
                comments: comment_options(options),
                source_map_path: Some(PathBuf::from(session.generated_path())),
                ..CodegenOptions::default()
            })
            .with_scoping(scoping)
            .build(&program);

        let map = generated
            .map
            .ok_or_else(|| anyhow!("Code generator returned no source map"))?;
        session
            .record_mappings(&map.to_json_string())
            .context("Failed to record minifier mappings")?;

        Ok(MinifyOutcome::Minified {
            code: generated.code,
        })
    }
}

fn comment_options(options: &MinifyOptions) -> CommentOptions {
    let base = if options.minify_code {
        CommentOptions::disabled()
    } else {
        CommentOptions::default()
    };
    let legal = if options.preserve_important_comments {
        LegalComment::Inline
    } else {
        LegalComment::None
    };
    CommentOptions { legal, ..base }
}

/// Whether any scope in the program calls the global `eval` directly
fn contains_direct_eval(program: &Program<'_>) -> bool {
    let semantic = SemanticBuilder::new().build(program).semantic;
    let scoping = semantic.scoping();
    let found = scoping
        .scope_descendants_from_root()
        .any(|scope_id| scoping.scope_flags(scope_id).contains_direct_eval());
    found
}
