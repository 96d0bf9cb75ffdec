// Stack trace remapping through published bundle source maps

use crate::js::bundle::paths::map_path;
use crate::js::registry::BundleTable;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// `:line:col` at the end of a stack frame location
static FRAME_POSITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(\d+):(\d+)\)?\s*$").expect("Invalid regex"));

/// Resolves minified stack frames back to original files
///
/// Maps are keyed by the virtual path of the bundle they describe.
#[derive(Default)]
pub struct StackRemapper {
    maps: HashMap<String, sourcemap::SourceMap>,
}

impl StackRemapper {
    /// Create a new empty remapper
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source map for a bundle
    ///
    /// Returns `false` (and logs a warning) when the map cannot be parsed.
    pub fn register(&mut self, bundle: &str, map_json: &str) -> bool {
        match sourcemap::SourceMap::from_slice(map_json.as_bytes()) {
            Ok(sm) => {
                self.maps.insert(bundle.to_string(), sm);
                tracing::debug!(bundle = %bundle, "Registered source map");
                true
            }
            Err(e) => {
                tracing::warn!(
                    bundle = %bundle,
                    error = %e,
                    "Failed to parse source map"
                );
                false
            }
        }
    }

    /// Register the map a build published for `bundle`
    pub fn load_published(&mut self, table: &BundleTable, bundle: &str) -> bool {
        match table.fetch(&map_path(bundle)) {
            Some(json) => self.register(bundle, &json),
            None => false,
        }
    }

    pub fn has_map(&self, bundle: &str) -> bool {
        self.maps.contains_key(bundle)
    }

    pub fn unregister(&mut self, bundle: &str) -> bool {
        self.maps.remove(bundle).is_some()
    }

    /// Remap every frame of a stack trace produced by `bundle`
    ///
    /// Frames use 1-based `line:col`. Frames without a matching token, and
    /// whole traces for bundles without a map, are returned unchanged.
    pub fn remap_stack(&self, bundle: &str, raw_stack: &str) -> String {
        let Some(sm) = self.maps.get(bundle) else {
            return raw_stack.to_string();
        };

        raw_stack
            .lines()
            .map(|frame| remap_frame(frame, sm))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn remap_frame(frame: &str, sm: &sourcemap::SourceMap) -> String {
    let Some(caps) = FRAME_POSITION.captures(frame) else {
        return frame.to_string();
    };
    let (Ok(line), Ok(col)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
        return frame.to_string();
    };
    let Some(token) = sm.lookup_token(line.saturating_sub(1), col.saturating_sub(1)) else {
        return frame.to_string();
    };
    let Some(src) = token.get_source() else {
        return frame.to_string();
    };

    let Some(whole) = caps.get(0) else {
        return frame.to_string();
    };
    let location_start = frame[..whole.start()]
        .rfind(|c: char| c == '(' || c.is_whitespace())
        .map_or(0, |i| i + 1);

    format!(
        "{}{}:{}:{}{}",
        &frame[..location_start],
        src,
        token.get_src_line() + 1,
        token.get_src_col() + 1,
        if whole.as_str().contains(')') { ")" } else { "" }
    )
}
