// Source map recording session for one bundle build
//
// The minifier reports mappings against the concatenated buffer. The session
// folds those back onto the files the buffer was built from, so the published
// map points at each constituent file rather than at the concatenation.

use crate::js::bundle::paths::mapping_url;
use crate::js::error::SourceMapError;
use sourcemap::{SourceMap, SourceMapBuilder};

/// Where a file's text starts inside the concatenated buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOrigin {
    /// Virtual path of the constituent file
    pub path: String,

    /// Zero-based line of the buffer where the file's text begins
    pub start_line: u32,

    /// Text the minifier saw for this file
    pub content: String,
}

/// Accumulates position mappings and serializes them as a version 3 map
pub struct SourceMapSession {
    generated_path: String,
    map_path: String,
    builder: SourceMapBuilder,
    /// (start_line, source id), ascending by start line
    origins: Vec<(u32, u32)>,
    token_count: usize,
}

impl SourceMapSession {
    /// Start a session for the artifact at `generated_path` whose map will be
    /// served from `map_path`
    pub fn new(generated_path: &str, map_path: &str) -> Self {
        Self {
            generated_path: generated_path.to_string(),
            map_path: map_path.to_string(),
            builder: SourceMapBuilder::new(Some(generated_path)),
            origins: Vec::new(),
            token_count: 0,
        }
    }

    /// Virtual path of the generated artifact
    pub fn generated_path(&self) -> &str {
        &self.generated_path
    }

    /// Virtual path the map will be published at
    pub fn map_path(&self) -> &str {
        &self.map_path
    }

    /// Register the constituent files, in buffer order
    ///
    /// Every file is listed in `sources`, with its text as `sourcesContent`,
    /// even if no mapping ends up pointing into it.
    pub fn add_source_origins(&mut self, origins: &[SourceOrigin]) {
        for origin in origins {
            let id = self.builder.add_source(&origin.path);
            self.builder
                .set_source_contents(id, Some(origin.content.as_str()));
            self.origins.push((origin.start_line, id));
        }
        self.origins.sort_by_key(|(start, _)| *start);
    }

    /// Fold a map generated against the concatenated buffer into this session
    ///
    /// Returns the number of tokens recorded.
    pub fn record_mappings(&mut self, generated_map: &str) -> Result<usize, SourceMapError> {
        let generated =
            SourceMap::from_slice(generated_map.as_bytes()).map_err(SourceMapError::Parse)?;

        let mut recorded = 0;
        for token in generated.tokens() {
            if token.get_source().is_none() {
                continue;
            }
            let buffer_line = token.get_src_line();
            let Some((start_line, source_id)) = self.origin_of(buffer_line) else {
                continue;
            };
            let name_id = token.get_name().map(|name| self.builder.add_name(name));

            self.builder.add_raw(
                token.get_dst_line(),
                token.get_dst_col(),
                buffer_line - start_line,
                token.get_src_col(),
                Some(source_id),
                name_id,
                false,
            );
            recorded += 1;
        }

        self.token_count += recorded;
        Ok(recorded)
    }

    /// Tokens recorded so far
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Trailing comment that points browsers at the published map
    pub fn mapping_comment(&self) -> String {
        format!("//# sourceMappingURL={}", mapping_url(&self.map_path))
    }

    /// Serialize the recorded map to JSON
    pub fn flush(self) -> Result<String, SourceMapError> {
        let map = self.builder.into_sourcemap();
        let mut buf = Vec::new();
        map.to_writer(&mut buf).map_err(SourceMapError::Serialize)?;
        Ok(String::from_utf8(buf)?)
    }

    fn origin_of(&self, buffer_line: u32) -> Option<(u32, u32)> {
        let idx = self
            .origins
            .partition_point(|(start, _)| *start <= buffer_line);
        idx.checked_sub(1).map(|i| self.origins[i])
    }
}
