//! Sitemap: a forest of navigation nodes plus its lookup indices.
//!
//! Nodes live in a table keyed by [`NodeId`]; structure lives in a
//! [`Forest<NodeId>`]. The URI index is kept in sync by every mutation, so
//! `uri_index[uri(node)] == node.id()` holds for every node at all times.
//!
//! Mutators are crate-private. The master sitemap is mutated only through
//! [`MasterSitemapBuilder`](crate::MasterSitemapBuilder) and user sitemaps
//! only through derivation, so a handed-out `Sitemap` is read-only.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::{ForestError, SiteError};
use crate::forest::Forest;
use crate::node::{NodeId, SitemapNode, StandardPageKey};
use crate::uri::{StrictUriHandler, UriHandler};

/// Forest of nodes with URI, standard page and redirect indices.
pub struct Sitemap<N> {
    forest: Forest<NodeId>,
    nodes: HashMap<NodeId, Arc<N>>,
    uri_index: HashMap<String, NodeId>,
    standard_pages: HashMap<StandardPageKey, NodeId>,
    redirects: BTreeMap<String, String>,
    uri_handler: Arc<dyn UriHandler>,
}

impl<N> fmt::Debug for Sitemap<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sitemap")
            .field("nodes", &self.nodes.len())
            .field("roots", &self.forest.roots().len())
            .field("standard_pages", &self.standard_pages.len())
            .field("redirects", &self.redirects.len())
            .finish_non_exhaustive()
    }
}

impl<N: SitemapNode> Default for Sitemap<N> {
    fn default() -> Self {
        Self::new(Arc::new(StrictUriHandler))
    }
}

impl<N: SitemapNode> Sitemap<N> {
    /// Create an empty sitemap using `uri_handler` for path normalization.
    #[must_use]
    pub(crate) fn new(uri_handler: Arc<dyn UriHandler>) -> Self {
        Self {
            forest: Forest::new(),
            nodes: HashMap::new(),
            uri_index: HashMap::new(),
            standard_pages: HashMap::new(),
            redirects: BTreeMap::new(),
            uri_handler,
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the sitemap has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True if a node with `id` is present.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&N> {
        self.nodes.get(&id).map(Arc::as_ref)
    }

    pub(crate) fn node_arc(&self, id: NodeId) -> Option<&Arc<N>> {
        self.nodes.get(&id)
    }

    /// Root nodes in sibling order.
    #[must_use]
    pub fn roots(&self) -> Vec<&N> {
        self.resolve_ids(self.forest.roots())
    }

    /// Children of `id` in sibling order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<&N> {
        self.resolve_ids(self.forest.children(id))
    }

    /// Parent of `id`.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<&N> {
        self.forest.parent(id).and_then(|p| self.node(p))
    }

    /// Ancestors of `id`, root first, ending with the node itself.
    #[must_use]
    pub fn node_chain(&self, id: NodeId) -> Vec<&N> {
        self.resolve_ids(&self.forest.node_chain(id))
    }

    /// Every node in pre-order, root by root.
    #[must_use]
    pub fn nodes(&self) -> Vec<&N> {
        self.resolve_ids(&self.forest.walk())
    }

    /// Underlying structure.
    #[must_use]
    pub fn forest(&self) -> &Forest<NodeId> {
        &self.forest
    }

    /// Redirect table, source path to target path.
    #[must_use]
    pub fn redirects(&self) -> &BTreeMap<String, String> {
        &self.redirects
    }

    /// Registered standard pages.
    pub fn standard_pages(&self) -> impl Iterator<Item = (StandardPageKey, &N)> + '_ {
        self.standard_pages
            .iter()
            .filter_map(|(&key, &id)| self.node(id).map(|node| (key, node)))
    }

    /// Path handler used for normalization.
    #[must_use]
    pub fn uri_handler(&self) -> &dyn UriHandler {
        self.uri_handler.as_ref()
    }

    pub(crate) fn uri_handler_arc(&self) -> Arc<dyn UriHandler> {
        Arc::clone(&self.uri_handler)
    }

    pub(crate) fn uri_index(&self) -> &HashMap<String, NodeId> {
        &self.uri_index
    }

    pub(crate) fn standard_page_id(&self, key: StandardPageKey) -> Option<NodeId> {
        self.standard_pages.get(&key).copied()
    }

    fn resolve_ids(&self, ids: &[NodeId]) -> Vec<&N> {
        ids.iter().filter_map(|&id| self.node(id)).collect()
    }

    /// Full URI of the node with `id`: its chain's segments, encoded and
    /// joined by the URI handler.
    pub(crate) fn uri_of(&self, id: NodeId) -> String {
        let segments: Vec<String> = self
            .forest
            .node_chain(id)
            .into_iter()
            .filter_map(|k| self.node(k))
            .map(|node| node.uri_segment().to_owned())
            .collect();
        self.uri_handler.path(&segments)
    }

    /// Normalize a raw path into an index key.
    ///
    /// Keys are canonical encoded paths, so `normalize(uri_of(id))` is
    /// `uri_of(id)` for every node.
    pub(crate) fn normalize(&self, path: &str) -> String {
        self.uri_handler.path(&self.uri_handler.segments(path))
    }

    /// Index key contribution of a single segment.
    fn encode_segment(&self, segment: &str) -> String {
        self.uri_handler.path(&[segment.to_owned()])
    }

    /// Add `node` as a new root.
    pub(crate) fn insert_root(&mut self, node: N) -> Result<NodeId, SiteError> {
        let segment = node.uri_segment();
        check_segment(segment)?;
        let uri = self.encode_segment(segment);
        self.insert(None, node, uri)
    }

    /// Add `node` as the last child of `parent`.
    pub(crate) fn insert_child(&mut self, parent: NodeId, node: N) -> Result<NodeId, SiteError> {
        let parent_node = self
            .node(parent)
            .ok_or(SiteError::Forest(ForestError::UnknownNode(parent)))?;
        let segment = node.uri_segment();
        check_child_segment(parent_node.uri_segment(), segment)?;
        let uri = format!("{}/{}", self.uri_of(parent), self.encode_segment(segment));
        self.insert(Some(parent), node, uri)
    }

    fn insert(
        &mut self,
        parent: Option<NodeId>,
        node: N,
        uri: String,
    ) -> Result<NodeId, SiteError> {
        if self.uri_index.contains_key(&uri) {
            return Err(SiteError::DuplicateUri(uri));
        }

        let id = node.id();
        self.forest.add_node(id)?;
        if let Some(parent) = parent {
            self.forest.add_child(parent, id)?;
        }
        self.nodes.insert(id, Arc::new(node));
        self.uri_index.insert(uri, id);
        Ok(id)
    }

    /// Move an existing node and its subtree under `parent`.
    ///
    /// Validates the new URIs of the whole subtree before touching anything.
    pub(crate) fn move_node(&mut self, parent: NodeId, child: NodeId) -> Result<(), SiteError> {
        let parent_node = self
            .node(parent)
            .ok_or(SiteError::Forest(ForestError::UnknownNode(parent)))?;
        let child_node = self
            .node(child)
            .ok_or(SiteError::Forest(ForestError::UnknownNode(child)))?;
        if parent == child || self.forest.is_ancestor(child, parent) {
            return Err(ForestError::CycleDetected { parent, child }.into());
        }
        check_child_segment(parent_node.uri_segment(), child_node.uri_segment())?;
        if self.forest.parent(child) == Some(parent) {
            return Ok(());
        }

        let subtree = self.forest.subtree(child);
        let old_uris: Vec<String> = subtree.iter().map(|&id| self.uri_of(id)).collect();
        let old_prefix = self.uri_of(child);
        let new_prefix = format!(
            "{}/{}",
            self.uri_of(parent),
            self.encode_segment(child_node.uri_segment())
        );
        let new_uris: Vec<String> = old_uris
            .iter()
            .map(|uri| format!("{new_prefix}{}", &uri[old_prefix.len()..]))
            .collect();

        if let Some(taken) = new_uris
            .iter()
            .find(|uri| self.uri_index.get(*uri).is_some_and(|id| !subtree.contains(id)))
        {
            return Err(SiteError::DuplicateUri(taken.clone()));
        }

        self.forest.add_child(parent, child)?;
        for uri in &old_uris {
            self.uri_index.remove(uri);
        }
        for (uri, id) in new_uris.into_iter().zip(subtree) {
            self.uri_index.insert(uri, id);
        }
        Ok(())
    }

    /// Remove `id` and its subtree, returning the removed ids in pre-order.
    ///
    /// Standard pages pointing into the subtree and redirects targeting it
    /// are removed as well.
    pub(crate) fn remove(&mut self, id: NodeId) -> Result<Vec<NodeId>, SiteError> {
        let uris: Vec<String> = self
            .forest
            .subtree(id)
            .into_iter()
            .map(|k| self.uri_of(k))
            .collect();
        let removed = self.forest.remove_node(id)?;

        for uri in &uris {
            self.uri_index.remove(uri);
        }
        for k in &removed {
            self.nodes.remove(k);
        }
        self.standard_pages.retain(|_, k| !removed.contains(k));
        self.redirects.retain(|_, to| !uris.contains(to));

        Ok(removed)
    }

    /// Register a single-hop redirect. Both paths are normalized.
    pub(crate) fn insert_redirect(&mut self, from: &str, to: &str) {
        let from = self.normalize(from);
        let to = self.normalize(to);
        self.redirects.insert(from, to);
    }

    /// Point `key` at the node `id`.
    pub(crate) fn insert_standard_page(
        &mut self,
        key: StandardPageKey,
        id: NodeId,
    ) -> Result<(), SiteError> {
        if !self.contains(id) {
            return Err(ForestError::UnknownNode(id).into());
        }
        self.standard_pages.insert(key, id);
        Ok(())
    }

    /// Reorder the children of `parent` (roots when `None`).
    pub(crate) fn sort_children_by<F>(&mut self, parent: Option<NodeId>, mut compare: F)
    where
        F: FnMut(&N, &N) -> std::cmp::Ordering,
    {
        let nodes = &self.nodes;
        self.forest.sort_children_by(parent, |a, b| {
            match (nodes.get(a), nodes.get(b)) {
                (Some(a), Some(b)) => compare(Arc::as_ref(a), Arc::as_ref(b)),
                _ => std::cmp::Ordering::Equal,
            }
        });
    }
}

impl<N: SitemapNode + Clone> Sitemap<N> {
    /// Mutable access to a node. Clones the node if it is shared.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut N> {
        self.nodes.get_mut(&id).map(Arc::make_mut)
    }
}

fn check_segment(segment: &str) -> Result<(), SiteError> {
    if segment.contains('/') {
        return Err(SiteError::InvalidSegment {
            segment: segment.to_owned(),
            reason: "segments cannot contain '/'",
        });
    }
    Ok(())
}

fn check_child_segment(parent_segment: &str, segment: &str) -> Result<(), SiteError> {
    check_segment(segment)?;
    if segment.is_empty() {
        return Err(SiteError::InvalidSegment {
            segment: segment.to_owned(),
            reason: "only root nodes can have an empty segment",
        });
    }
    if parent_segment.is_empty() {
        return Err(SiteError::InvalidSegment {
            segment: segment.to_owned(),
            reason: "the empty root segment cannot have children",
        });
    }
    Ok(())
}
