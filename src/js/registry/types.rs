// Binding types - the closed set of resources a virtual path can resolve to

use std::fmt;

/// Kind of resource bound at a virtual path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Bundle declared by configuration
    StaticBundle,

    /// Content published during a build (maps, transformed copies)
    AdHocBundle,

    /// Anything else the serving layer registered
    Other(String),
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::StaticBundle => f.write_str("static bundle"),
            ResourceKind::AdHocBundle => f.write_str("ad-hoc artifact"),
            ResourceKind::Other(kind) => write!(f, "{} resource", kind),
        }
    }
}

/// Statically declared bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticBundle {
    /// Constituent virtual paths in bundle order
    pub files: Vec<String>,
}

/// Content-settable artifact created by a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdHocArtifact {
    content: String,
}

impl AdHocArtifact {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the content; returns `true` when it changed
    pub fn set_content(&mut self, content: &str) -> bool {
        if self.content == content {
            return false;
        }
        self.content.clear();
        self.content.push_str(content);
        true
    }
}

/// A resource bound at a virtual path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Static(StaticBundle),
    AdHoc(AdHocArtifact),
    Other { kind: String },
}

impl Binding {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Binding::Static(_) => ResourceKind::StaticBundle,
            Binding::AdHoc(_) => ResourceKind::AdHocBundle,
            Binding::Other { kind } => ResourceKind::Other(kind.clone()),
        }
    }
}
