// In-memory bundle table with upsert of derived artifacts

use super::types::{AdHocArtifact, Binding, ResourceKind};
use crate::js::error::PublishError;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Outcome of publishing a derived artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishAction {
    /// No binding existed; a new ad-hoc artifact was inserted
    Created,
    /// An ad-hoc artifact existed and its content was replaced
    Updated,
    /// An ad-hoc artifact existed with identical content
    Unchanged,
}

/// Virtual path → binding table shared by bundle builds and the serving layer
///
/// Lookups take a read lock; `publish` does its lookup and write under a
/// single write lock, so concurrent builds publishing distinct paths never
/// observe each other's half-written state.
#[derive(Debug, Default)]
pub struct BundleTable {
    bindings: RwLock<HashMap<String, Binding>>,
}

impl BundleTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a resource at `path`, replacing whatever was there
    ///
    /// This is the serving layer's registration hook (e.g. for static bundles).
    pub fn insert(&self, path: impl Into<String>, binding: Binding) -> Option<Binding> {
        self.bindings.write().insert(path.into(), binding)
    }

    /// Look up the binding at `path`
    pub fn get(&self, path: &str) -> Option<Binding> {
        self.bindings.read().get(path).cloned()
    }

    /// Kind of the binding at `path`, if any
    pub fn kind(&self, path: &str) -> Option<ResourceKind> {
        self.bindings.read().get(path).map(Binding::kind)
    }

    /// Content of the ad-hoc artifact at `path`
    ///
    /// Returns `None` for unbound paths and for bindings served elsewhere.
    pub fn fetch(&self, path: &str) -> Option<String> {
        match self.bindings.read().get(path) {
            Some(Binding::AdHoc(artifact)) => Some(artifact.content().to_string()),
            _ => None,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.bindings.read().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }

    /// All ad-hoc artifacts as `(path, content)`, sorted by path
    pub fn artifacts(&self) -> Vec<(String, String)> {
        let bindings = self.bindings.read();
        let mut artifacts: Vec<(String, String)> = bindings
            .iter()
            .filter_map(|(path, binding)| match binding {
                Binding::AdHoc(artifact) => Some((path.clone(), artifact.content().to_string())),
                _ => None,
            })
            .collect();
        artifacts.sort_by(|a, b| a.0.cmp(&b.0));
        artifacts
    }

    /// Publish derived content at `path`
    ///
    /// Creates an ad-hoc artifact when the path is unbound and overwrites the
    /// content of an existing one. Any other kind of binding at `path` is a
    /// configuration collision and is left untouched.
    pub fn publish(&self, path: &str, content: &str) -> Result<PublishAction, PublishError> {
        let mut bindings = self.bindings.write();

        let action = match bindings.get_mut(path) {
            None => {
                bindings.insert(path.to_string(), Binding::AdHoc(AdHocArtifact::new(content)));
                PublishAction::Created
            }
            Some(Binding::AdHoc(artifact)) => {
                if artifact.set_content(content) {
                    PublishAction::Updated
                } else {
                    PublishAction::Unchanged
                }
            }
            Some(other) => {
                return Err(PublishError::Collision {
                    path: path.to_string(),
                    kind: other.kind(),
                });
            }
        };

        tracing::debug!(path = %path, action = ?action, bytes = content.len(), "Published artifact");
        Ok(action)
    }
}
