// Content concatenation with per-file origin tracking

use super::paths::transformed_path;
use super::source::SourceFile;
use crate::js::minify::SourceOrigin;
use crate::js::registry::BundleTable;
use anyhow::Result;

/// Concatenated bundle text plus where each file landed in it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Concatenation {
    pub text: String,
    pub origins: Vec<SourceOrigin>,
}

/// Join the post-transform text of `files` into one buffer
///
/// Every file is followed by a `\n`. Files with at least one transform have
/// their transformed text published at `transformed_path(file)` before the
/// next file is processed.
pub fn concatenate(files: &[SourceFile], table: &BundleTable) -> Result<Concatenation> {
    let mut text = String::new();
    let mut origins = Vec::with_capacity(files.len());
    let mut line: u32 = 0;

    for file in files {
        let content = file.apply_transforms()?;

        if file.transform_count() > 0 {
            table.publish(&transformed_path(&file.path), &content)?;
        }

        text.push_str(&content);
        text.push('\n');

        let start_line = line;
        line = line.saturating_add(count_lines(&content)).saturating_add(1);
        origins.push(SourceOrigin {
            path: file.path.clone(),
            start_line,
            content,
        });
    }

    Ok(Concatenation { text, origins })
}

/// Raw contents joined the same way, without running transforms
///
/// Used as fallback text when running the transforms themselves failed.
pub fn concatenate_raw(files: &[SourceFile]) -> String {
    let mut text = String::new();
    for file in files {
        text.push_str(&file.content);
        text.push('\n');
    }
    text
}

fn count_lines(text: &str) -> u32 {
    let newlines = text.bytes().filter(|b| *b == b'\n').count();
    u32::try_from(newlines).unwrap_or(u32::MAX)
}
