// Build settings for bundle construction

use serde::{Deserialize, Serialize};

/// Per-build minification settings
///
/// Passed by reference into every build; nothing here is process-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Shrink whitespace, compress and rename identifiers
    pub minify_code: bool,

    /// Keep `/*! ... */`, `@license` and `@preserve` comments in the output
    pub preserve_important_comments: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify_code: false,
            preserve_important_comments: true,
        }
    }
}

impl BuildSettings {
    /// Settings for a production build
    pub fn minified() -> Self {
        Self {
            minify_code: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let settings = BuildSettings::default();
        assert!(!settings.minify_code);
        assert!(settings.preserve_important_comments);
    }

    #[test]
    fn minified_keeps_important_comments() {
        let settings = BuildSettings::minified();
        assert!(settings.minify_code);
        assert!(settings.preserve_important_comments);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: BuildSettings = toml::from_str("minify_code = true").unwrap();
        assert!(settings.minify_code);
        assert!(settings.preserve_important_comments);

        let settings: BuildSettings = toml::from_str("").unwrap();
        assert_eq!(settings, BuildSettings::default());
    }

    #[test]
    fn settings_json_field_names() {
        let json = serde_json::to_value(BuildSettings::default()).unwrap();
        assert_eq!(json["minify_code"], false);
        assert_eq!(json["preserve_important_comments"], true);
    }
}
