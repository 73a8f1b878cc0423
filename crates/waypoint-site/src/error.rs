//! Error types for sitemap construction and derivation.
//!
//! Structural errors ([`ForestError`], [`SiteError`], [`BuildError`]) are
//! programmer errors raised while a master sitemap is being built. Resolution
//! misses are never errors; they surface as `Option` or empty `Vec` results.

use std::fmt::Debug;

use crate::node::NodeId;

/// Error raised by [`Forest`](crate::Forest) mutations.
///
/// A failed mutation leaves the forest unchanged.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ForestError<K: Debug> {
    /// The node is already part of the forest.
    #[error("Node {0:?} is already in the forest")]
    DuplicateNode(K),
    /// Attaching the child would make it its own ancestor.
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// Requested parent.
        parent: K,
        /// Requested child.
        child: K,
    },
    /// The node is not part of the forest.
    #[error("Node {0:?} is not in the forest")]
    UnknownNode(K),
}

/// Error raised by structural sitemap mutations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SiteError {
    /// Underlying forest rejected the mutation.
    #[error(transparent)]
    Forest(#[from] ForestError<NodeId>),
    /// Another node is already registered under this URI.
    #[error("URI already registered: {0:?}")]
    DuplicateUri(String),
    /// Segment cannot be used at this position.
    #[error("Invalid URI segment {segment:?}: {reason}")]
    InvalidSegment {
        /// Offending segment.
        segment: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// Standard page key not recognized.
    #[error("Unknown standard page: {0}")]
    UnknownStandardPage(String),
}

/// Error returned when freezing a master sitemap fails its checks.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Structural error while applying the definition.
    #[error(transparent)]
    Site(#[from] SiteError),
    /// Nodes with neither a view nor a redirect.
    #[error("Nodes without a view or redirect: {}", .0.join(", "))]
    MissingViews(Vec<String>),
    /// Redirects pointing at URIs that do not exist.
    #[error("Redirect targets not found: {}", format_redirects(.0))]
    DanglingRedirects(Vec<(String, String)>),
}

fn format_redirects(redirects: &[(String, String)]) -> String {
    redirects
        .iter()
        .map(|(from, to)| format!("{from:?} -> {to:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error returned by the tree copy engine.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CopyError {
    /// Source tree visits a node twice.
    #[error("Cycle detected in copy source at {0}")]
    CycleDetected(String),
    /// Target rejected a node.
    #[error("Failed to attach copied node: {0}")]
    Attach(#[from] SiteError),
}
