//! Sibling orderings for user sitemaps.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::node::{SitemapNode, UserNode};

/// What siblings are ordered by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKind {
    /// Locale-aware comparison of translated labels.
    #[default]
    Collated,
    /// Order of creation in the master sitemap.
    Insertion,
    /// Explicit position index.
    Position,
}

/// Direction applied on top of a [`SortKind`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// A complete sibling ordering.
///
/// Collated and position orderings break ties by insertion order, so every
/// ordering is total over the nodes of one master sitemap. Descending reverses
/// the whole comparison including the tie-break.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeOrder {
    pub kind: SortKind,
    #[serde(default)]
    pub direction: SortDirection,
}

impl NodeOrder {
    #[must_use]
    pub fn new(kind: SortKind, direction: SortDirection) -> Self {
        Self { kind, direction }
    }

    /// Ascending ordering of `kind`.
    #[must_use]
    pub fn ascending(kind: SortKind) -> Self {
        Self::new(kind, SortDirection::Ascending)
    }

    /// Compare two sibling nodes.
    #[must_use]
    pub fn compare(self, a: &UserNode, b: &UserNode) -> Ordering {
        let (ma, mb) = (a.master(), b.master());
        let ordering = match self.kind {
            SortKind::Collated => a
                .collation_key()
                .cmp(b.collation_key())
                .then_with(|| ma.insertion_order().cmp(&mb.insertion_order())),
            SortKind::Insertion => ma.insertion_order().cmp(&mb.insertion_order()),
            SortKind::Position => ma
                .position_index()
                .cmp(&mb.position_index())
                .then_with(|| ma.insertion_order().cmp(&mb.insertion_order())),
        };

        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    /// Sort a list of nodes in place.
    pub fn sort(self, nodes: &mut [&UserNode]) {
        nodes.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for SortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Collated => "collated",
            Self::Insertion => "insertion",
            Self::Position => "position",
        })
    }
}

impl FromStr for SortKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collated" => Ok(Self::Collated),
            "insertion" => Ok(Self::Insertion),
            "position" => Ok(Self::Position),
            other => Err(format!(
                "unknown sort '{other}', expected collated, insertion or position"
            )),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascending" | "asc" => Ok(Self::Ascending),
            "descending" | "desc" => Ok(Self::Descending),
            other => Err(format!(
                "unknown direction '{other}', expected ascending or descending"
            )),
        }
    }
}
