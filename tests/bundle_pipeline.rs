// Integration tests for the bundle pipeline
//
// These tests verify end-to-end behaviour of:
// - Concatenation order and transformed-file publication
// - Source map publication and its v3 structure
// - Fallback content for minifier diagnostics and unexpected faults
// - Registry collisions surfacing as errors

use scriptbundle::js::bundle::{BuildOutput, Bundle, BundleBuilder, Replacement, SourceFile};
use scriptbundle::js::config::BuildSettings;
use scriptbundle::js::diagnostics::{DiagnosticSink, FaultRecord};
use scriptbundle::js::error::PublishError;
use scriptbundle::js::minify::{MinifyOptions, MinifyOutcome, ScriptMinifier, SourceMapSession};
use scriptbundle::js::registry::{Binding, BundleTable, ResourceKind, StaticBundle};
use scriptbundle::js::remap::StackRemapper;

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;

const SECRET: &str = "token-table exhausted at 0xdeadbeef";

#[derive(Default)]
struct CollectingSink {
    records: Mutex<Vec<FaultRecord>>,
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, record: &FaultRecord) {
        self.records.lock().push(record.clone());
    }
}

/// Minifies by passing text through, then feeds the session a corrupt map
struct CorruptMapMinifier;

impl ScriptMinifier for CorruptMapMinifier {
    fn minify(
        &self,
        source: &str,
        _options: &MinifyOptions,
        session: &mut SourceMapSession,
    ) -> Result<MinifyOutcome> {
        session.record_mappings(&format!("{{\"version\":3,\"{}\"", SECRET))?;
        Ok(MinifyOutcome::Minified {
            code: source.to_string(),
        })
    }
}

/// Reports fixed diagnostics without touching the input
struct RejectingMinifier;

impl ScriptMinifier for RejectingMinifier {
    fn minify(
        &self,
        _source: &str,
        _options: &MinifyOptions,
        _session: &mut SourceMapSession,
    ) -> Result<MinifyOutcome> {
        Ok(MinifyOutcome::Diagnostics(vec![
            "Unexpected token at 1:4".to_string(),
            "Unsupported syntax at 2:1".to_string(),
        ]))
    }
}

fn example_bundle() -> Bundle {
    Bundle::new(
        "/bundles/site.js",
        vec![
            SourceFile::new("/scripts/a.js", "var a=1;"),
            SourceFile::new("/scripts/b.js", "var b=2;")
                .with_transform(Arc::new(Replacement::new("var b = 2;"))),
        ],
    )
}

/// Two files, one transformed, minified: content, map and transformed copy
#[test]
fn end_to_end_example() {
    let table = Arc::new(BundleTable::new());
    let builder = BundleBuilder::new(table.clone());
    let settings = BuildSettings {
        minify_code: true,
        preserve_important_comments: true,
    };

    let output = builder.build(&example_bundle(), &settings).unwrap();
    assert!(output.is_minified());

    let content = output.content();
    assert!(content.contains("a=1"), "content: {}", content);
    assert!(content.contains("b=2"), "content: {}", content);
    let a = content.find("a=1").unwrap();
    let b = content.find("b=2").unwrap();
    assert!(a < b, "concatenation order must be preserved");

    assert!(table.fetch("/bundles/site.jsmap").is_some());
    assert_eq!(
        table.fetch("/scripts/b.transformed.js").as_deref(),
        Some("var b = 2;")
    );
    assert!(table.fetch("/scripts/a.transformed.js").is_none());
    assert_eq!(table.len(), 2);
}

/// The published map is a v3 document naming the constituent files
#[test]
fn published_map_references_constituent_files() {
    let table = Arc::new(BundleTable::new());
    let builder = BundleBuilder::new(table.clone());
    builder
        .build(&example_bundle(), &BuildSettings::minified())
        .unwrap();

    let json = table.fetch("/bundles/site.jsmap").unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["version"], 3);
    assert_eq!(value["file"], "/bundles/site.js");
    assert_eq!(
        value["sources"],
        serde_json::json!(["/scripts/a.js", "/scripts/b.js"])
    );
    assert_eq!(value["sourcesContent"][1], "var b = 2;");
    assert!(value["mappings"].as_str().is_some_and(|m| !m.is_empty()));

    let map = sourcemap::SourceMap::from_slice(json.as_bytes()).unwrap();
    assert!(map
        .tokens()
        .any(|token| token.get_source() == Some("/scripts/b.js")));
}

/// Published maps remap frames of the built bundle
#[test]
fn published_map_drives_stack_remapping() {
    let table = Arc::new(BundleTable::new());
    let builder = BundleBuilder::new(table.clone());
    let bundle = Bundle::new(
        "/bundles/site.js",
        vec![
            SourceFile::new("/scripts/a.js", "var first = 1;"),
            SourceFile::new("/scripts/b.js", "function boom() {\n  throw new Error('x');\n}"),
        ],
    );
    builder.build(&bundle, &BuildSettings::default()).unwrap();

    let mut remapper = StackRemapper::new();
    assert!(remapper.load_published(&table, "/bundles/site.js"));

    // Unminified output keeps `function boom` on line 2, column 1
    let remapped = remapper.remap_stack("/bundles/site.js", "    at boom (site.js:2:1)");
    assert_eq!(remapped, "    at boom (/scripts/b.js:1:1)");
}

/// Every file's text appears in order, with at least one line break per file
#[test]
fn unminified_build_preserves_order_and_line_breaks() {
    let builder = BundleBuilder::new(Arc::new(BundleTable::new()));
    let bundle = Bundle::new(
        "/bundles/plain.js",
        vec![
            SourceFile::new("/scripts/one.js", "var one = 1;"),
            SourceFile::new("/scripts/two.js", "var two = 2;"),
            SourceFile::new("/scripts/three.js", "var three = 3;"),
        ],
    );
    let content = builder
        .build_bundle_content(&bundle, &BuildSettings::default())
        .unwrap();

    let positions: Vec<usize> = ["var one = 1;", "var two = 2;", "var three = 3;"]
        .iter()
        .map(|text| content.find(text).expect("statement missing"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(content.matches('\n').count() >= 3);
}

/// No transforms, no transformed artifacts
#[test]
fn untransformed_files_publish_only_the_map() {
    let table = Arc::new(BundleTable::new());
    let builder = BundleBuilder::new(table.clone());
    let bundle = Bundle::new(
        "/bundles/plain.js",
        vec![
            SourceFile::new("/scripts/one.js", "var one = 1;"),
            SourceFile::new("/scripts/two.js", "var two = 2;"),
        ],
    );
    builder.build(&bundle, &BuildSettings::minified()).unwrap();

    let paths: Vec<String> = table.artifacts().into_iter().map(|(p, _)| p).collect();
    assert_eq!(paths, vec!["/bundles/plain.jsmap".to_string()]);
}

/// Diagnostics: commented concatenation, no map, earlier map untouched
#[test]
fn diagnostics_keep_previous_map() {
    let table = Arc::new(BundleTable::new());
    let bundle = example_bundle();

    BundleBuilder::new(table.clone())
        .build(&bundle, &BuildSettings::minified())
        .unwrap();
    let previous_map = table.fetch("/bundles/site.jsmap").unwrap();

    let output = BundleBuilder::new(table.clone())
        .with_minifier(Arc::new(RejectingMinifier))
        .build(&bundle, &BuildSettings::minified())
        .unwrap();

    let content = output.content();
    assert!(content.starts_with(
        "/* An error occurred during minification, see errors below - returning concatenated content unminified."
    ));
    assert!(content.contains("Unexpected token at 1:4\n"));
    assert!(content.contains("Unsupported syntax at 2:1\n"));
    assert!(content.ends_with("*/\nvar a=1;\nvar b = 2;\n"));
    assert!(matches!(output, BuildOutput::Unminified { ref diagnostics, .. } if diagnostics.len() == 2));

    assert_eq!(table.fetch("/bundles/site.jsmap"), Some(previous_map));
}

/// Real syntax errors from the OXC parser take the diagnostics path
#[test]
fn syntax_error_serves_unminified_content() {
    let table = Arc::new(BundleTable::new());
    let builder = BundleBuilder::new(table.clone());
    let bundle = Bundle::new(
        "/bundles/broken.js",
        vec![
            SourceFile::new("/scripts/ok.js", "var ok = 1;"),
            SourceFile::new("/scripts/bad.js", "function ( {"),
        ],
    );
    let output = builder.build(&bundle, &BuildSettings::minified()).unwrap();

    assert!(matches!(output, BuildOutput::Unminified { .. }));
    assert!(output.content().ends_with("var ok = 1;\nfunction ( {\n"));
    assert!(table.fetch("/bundles/broken.jsmap").is_none());
}

/// A fault while building the map never leaks into the served content
#[test]
fn map_fault_is_reported_only_to_the_sink() {
    let table = Arc::new(BundleTable::new());
    let sink = Arc::new(CollectingSink::default());
    let builder = BundleBuilder::new(table.clone())
        .with_minifier(Arc::new(CorruptMapMinifier))
        .with_sink(sink.clone());

    let output = builder
        .build(&example_bundle(), &BuildSettings::minified())
        .unwrap();

    let content = output.content();
    assert_eq!(
        content,
        "/* An error occurred while building this bundle. Detailed diagnostics are available in the diagnostic log. */\nvar a=1;\nvar b = 2;\n"
    );
    assert!(!content.contains(SECRET));
    assert!(!content.contains("Invalid generated source map"));
    assert!(table.fetch("/bundles/site.jsmap").is_none());

    let records = sink.records.lock();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.bundle, "/bundles/site.js");
    assert!(record.message.contains("Invalid generated source map"));
    assert!(record.cause.is_some());
    assert_eq!(record.origin, "scriptbundle::bundle::minify");
    assert!(!record.stack_trace.is_empty());
    assert!(matches!(output, BuildOutput::Fault { .. }));
}

/// A failing transform falls back to the raw, untransformed sources
#[test]
fn transform_fault_falls_back_to_raw_sources() {
    struct FailingTransform;

    impl scriptbundle::js::bundle::Transform for FailingTransform {
        fn name(&self) -> &str {
            "es5"
        }

        fn process(&self, _path: &str, _input: &str) -> Result<String> {
            anyhow::bail!("{}", SECRET)
        }
    }

    let sink = Arc::new(CollectingSink::default());
    let builder = BundleBuilder::new(Arc::new(BundleTable::new())).with_sink(sink.clone());
    let bundle = Bundle::new(
        "/bundles/site.js",
        vec![
            SourceFile::new("/scripts/a.js", "var a=1;"),
            SourceFile::new("/scripts/b.js", "var b=2;").with_transform(Arc::new(FailingTransform)),
        ],
    );

    let content = builder
        .build_bundle_content(&bundle, &BuildSettings::minified())
        .unwrap();
    assert!(content.ends_with("*/\nvar a=1;\nvar b=2;\n"));
    assert!(!content.contains(SECRET));

    let records = sink.records.lock();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "Transform 'es5' failed for '/scripts/b.js'");
    assert_eq!(records[0].cause.as_deref(), Some(SECRET));
    assert_eq!(records[0].origin, "scriptbundle::bundle::concatenate");
}

/// A transformed-copy path already bound to a static bundle stops the build
#[test]
fn collision_fails_fast_with_named_path() {
    let table = Arc::new(BundleTable::new());
    table.insert(
        "/scripts/b.transformed.js",
        Binding::Static(StaticBundle {
            files: vec!["/scripts/legacy.js".to_string()],
        }),
    );
    let sink = Arc::new(CollectingSink::default());
    let builder = BundleBuilder::new(table.clone()).with_sink(sink.clone());

    let err = builder
        .build(&example_bundle(), &BuildSettings::minified())
        .unwrap_err();

    assert_eq!(
        err,
        PublishError::Collision {
            path: "/scripts/b.transformed.js".to_string(),
            kind: ResourceKind::StaticBundle,
        }
    );
    assert!(err.to_string().contains("/scripts/b.transformed.js"));
    assert!(sink.records.lock().is_empty());
    assert!(table.fetch("/bundles/site.jsmap").is_none());
}

/// Rebuilding publishes the same observable state
#[test]
fn rebuild_is_idempotent() {
    let table = Arc::new(BundleTable::new());
    let builder = BundleBuilder::new(table.clone());
    let bundle = example_bundle();

    let first = builder.build(&bundle, &BuildSettings::minified()).unwrap();
    let artifacts = table.artifacts();
    let second = builder.build(&bundle, &BuildSettings::minified()).unwrap();

    assert_eq!(first, second);
    assert_eq!(artifacts, table.artifacts());
}
