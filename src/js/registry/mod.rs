// Bundle table - virtual path bindings for bundles and derived artifacts

pub mod table;
pub mod types;

pub use table::{BundleTable, PublishAction};
pub use types::{AdHocArtifact, Binding, ResourceKind, StaticBundle};
