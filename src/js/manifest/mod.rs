// Bundle manifest parsing (bundle.toml)

use crate::js::bundle::{Bundle, Replacement, SourceFile};
use crate::js::config::BuildSettings;
use crate::js::error::ManifestError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parsed bundle.toml manifest
#[derive(Debug, Deserialize)]
pub struct BundleManifest {
    pub bundle: BundleSection,
    #[serde(default)]
    pub settings: BuildSettings,
    #[serde(default)]
    pub files: Vec<FileEntry>,

    /// Directory relative file paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Bundle identity section
#[derive(Debug, Deserialize)]
pub struct BundleSection {
    /// Virtual path the bundle is served from
    pub path: String,
}

/// One constituent file
#[derive(Debug, Deserialize)]
pub struct FileEntry {
    /// Virtual path of the file
    pub path: String,
    /// Raw content on disk
    pub source: PathBuf,
    /// Already-transformed output on disk, counted as one transform
    #[serde(default)]
    pub transformed: Option<PathBuf>,
}

impl BundleManifest {
    /// Load a manifest from disk; file paths resolve against its directory
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = read(path)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&text, base_dir)
    }

    /// Parse manifest text
    pub fn parse(text: &str, base_dir: PathBuf) -> Result<Self, ManifestError> {
        let mut manifest: BundleManifest = toml::from_str(text)?;
        if manifest.files.is_empty() {
            return Err(ManifestError::Empty(manifest.bundle.path));
        }
        manifest.base_dir = base_dir;
        Ok(manifest)
    }

    /// Read every file and assemble the bundle
    pub fn into_bundle(self) -> Result<(Bundle, BuildSettings), ManifestError> {
        let files = self
            .files
            .iter()
            .map(|entry| {
                let content = read(&self.base_dir.join(&entry.source))?;
                let mut file = SourceFile::new(entry.path.clone(), content);
                if let Some(transformed) = &entry.transformed {
                    let output = read(&self.base_dir.join(transformed))?;
                    file = file.with_transform(Arc::new(Replacement::new(output)));
                }
                Ok(file)
            })
            .collect::<Result<Vec<_>, ManifestError>>()?;

        Ok((Bundle::new(self.bundle.path, files), self.settings))
    }
}

fn read(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })
}
