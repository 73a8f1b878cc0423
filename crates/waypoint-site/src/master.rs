//! Master sitemap construction.
//!
//! The master sitemap has two phases. During bootstrap a
//! [`MasterSitemapBuilder`] accepts structural mutations; [`build`] freezes it
//! into a [`MasterSitemap`] that exposes reads only and can be shared across
//! threads without locking.
//!
//! [`build`]: MasterSitemapBuilder::build

use std::sync::Arc;

use crate::error::{BuildError, ForestError, SiteError};
use crate::node::{
    AccessControl, LabelKey, MasterNode, NodeDef, NodeId, SitemapNode, StandardPageKey, ViewRef,
};
use crate::sitemap::Sitemap;
use crate::uri::{StrictUriHandler, UriHandler};

/// The frozen, authoritative sitemap.
pub type MasterSitemap = Sitemap<MasterNode>;

/// What to do with nodes that have neither a view nor a redirect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MissingViewPolicy {
    /// Keep them as structural nodes.
    #[default]
    Allow,
    /// Assign the given view.
    Default(ViewRef),
    /// Fail the build.
    Reject,
}

/// Checks applied when freezing a master sitemap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckOptions {
    /// Handling of view-less nodes.
    pub missing_view: MissingViewPolicy,
    /// Fail the build if a redirect targets an unknown path.
    pub reject_dangling_redirects: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            missing_view: MissingViewPolicy::Allow,
            reject_dangling_redirects: true,
        }
    }
}

/// Builder for the master sitemap.
///
/// Insertion order is assigned per builder, starting at 1, in the order nodes
/// are first created.
pub struct MasterSitemapBuilder {
    sitemap: Sitemap<MasterNode>,
    next_insertion: u64,
}

impl Default for MasterSitemapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MasterSitemapBuilder {
    /// Create a builder using [`StrictUriHandler`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_uri_handler(Arc::new(StrictUriHandler))
    }

    /// Create a builder using a custom path handler.
    #[must_use]
    pub fn with_uri_handler(uri_handler: Arc<dyn UriHandler>) -> Self {
        Self {
            sitemap: Sitemap::new(uri_handler),
            next_insertion: 1,
        }
    }

    /// Read access to the sitemap under construction.
    #[must_use]
    pub fn sitemap(&self) -> &Sitemap<MasterNode> {
        &self.sitemap
    }

    /// Add a new root node.
    pub fn add_node(&mut self, def: NodeDef) -> Result<NodeId, SiteError> {
        let node = self.create(def);
        self.sitemap.insert_root(node)
    }

    /// Add a new node under `parent`.
    pub fn add_child(&mut self, parent: NodeId, def: NodeDef) -> Result<NodeId, SiteError> {
        let node = self.create(def);
        self.sitemap.insert_child(parent, node)
    }

    /// Move an existing node (with its subtree) under `parent`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), SiteError> {
        self.sitemap.move_node(parent, child)
    }

    /// Remove a node and its whole subtree.
    ///
    /// Standard pages pointing into the subtree and redirects targeting it are
    /// dropped too. Returns the removed ids in pre-order.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<NodeId>, SiteError> {
        self.sitemap.remove(id)
    }

    /// Register a single-hop redirect from one path to another.
    pub fn add_redirect(&mut self, from: &str, to: &str) {
        self.sitemap.insert_redirect(from, to);
    }

    /// Register `id` as the node for a standard page.
    pub fn add_standard_page(&mut self, key: StandardPageKey, id: NodeId) -> Result<(), SiteError> {
        self.sitemap.insert_standard_page(key, id)
    }

    /// Add or update the node at `path`, creating missing ancestors.
    ///
    /// Missing ancestors are structural: no view, the segment as label key,
    /// and the weakest access that still lets the entry's audience through
    /// (see [`AccessControl::ancestor_access`]). If a node already exists at
    /// `path` its view, label key and access are replaced.
    pub fn add_entry(
        &mut self,
        path: &str,
        view: Option<ViewRef>,
        label_key: LabelKey,
        access: AccessControl,
    ) -> Result<NodeId, SiteError> {
        let segments = self.sitemap.uri_handler().segments(path);
        let Some((last, ancestors)) = segments.split_last() else {
            return Err(SiteError::InvalidSegment {
                segment: path.to_owned(),
                reason: "path has no segments",
            });
        };

        let ancestor_access = access.ancestor_access();
        let mut parent: Option<NodeId> = None;
        for segment in ancestors {
            parent = Some(self.child_or_create(parent, segment, || {
                NodeDef::new(segment.as_str(), segment.as_str()).access(ancestor_access.clone())
            })?);
        }

        let id = self.child_or_create(parent, last, || {
            NodeDef::new(last.as_str(), label_key.clone())
        })?;
        if let Some(node) = self.sitemap.node_mut(id) {
            node.set_view(view);
            node.set_label_key(label_key);
            node.set_access(access);
        }
        Ok(id)
    }

    /// Replace the roles of a node.
    pub fn set_roles(&mut self, id: NodeId, roles: Vec<String>) -> Result<(), SiteError> {
        self.update(id, |node| node.set_roles(roles))
    }

    /// Replace the explicit position index of a node.
    pub fn set_position(&mut self, id: NodeId, position: i32) -> Result<(), SiteError> {
        self.update(id, |node| node.set_position_index(position))
    }

    /// Run the checks and freeze the sitemap.
    pub fn build(mut self, options: &CheckOptions) -> Result<MasterSitemap, BuildError> {
        self.check_views(&options.missing_view)?;
        if options.reject_dangling_redirects {
            self.check_redirects()?;
        }
        Ok(self.build_unchecked())
    }

    /// Freeze the sitemap without running any checks.
    #[must_use]
    pub fn build_unchecked(self) -> MasterSitemap {
        tracing::debug!(
            nodes = self.sitemap.len(),
            redirects = self.sitemap.redirects().len(),
            "Master sitemap built"
        );
        self.sitemap
    }

    fn create(&mut self, def: NodeDef) -> MasterNode {
        tracing::trace!(segment = def.segment(), order = self.next_insertion, "Creating node");
        let node = MasterNode::new(def, self.next_insertion);
        self.next_insertion += 1;
        node
    }

    fn child_or_create<F>(
        &mut self,
        parent: Option<NodeId>,
        segment: &str,
        def: F,
    ) -> Result<NodeId, SiteError>
    where
        F: FnOnce() -> NodeDef,
    {
        let siblings = match parent {
            Some(p) => self.sitemap.forest().children(p),
            None => self.sitemap.forest().roots(),
        };
        let existing = siblings.iter().copied().find(|&id| {
            self.sitemap
                .node(id)
                .is_some_and(|node| node.uri_segment() == segment)
        });

        match (existing, parent) {
            (Some(id), _) => Ok(id),
            (None, Some(p)) => self.add_child(p, def()),
            (None, None) => self.add_node(def()),
        }
    }

    fn update<F>(&mut self, id: NodeId, apply: F) -> Result<(), SiteError>
    where
        F: FnOnce(&mut MasterNode),
    {
        let node = self
            .sitemap
            .node_mut(id)
            .ok_or(ForestError::UnknownNode(id))?;
        apply(node);
        Ok(())
    }

    fn check_views(&mut self, policy: &MissingViewPolicy) -> Result<(), BuildError> {
        let missing: Vec<(NodeId, String)> = self
            .sitemap
            .nodes()
            .into_iter()
            .filter(|node| node.view().is_none())
            .map(|node| (node.id(), self.sitemap.uri(node)))
            .filter(|(_, uri)| !self.sitemap.redirects().contains_key(uri))
            .collect();

        match policy {
            MissingViewPolicy::Allow => {
                for (_, uri) in &missing {
                    tracing::debug!(uri = %uri, "Structural node without view");
                }
                Ok(())
            }
            MissingViewPolicy::Default(view) => {
                for (id, uri) in missing {
                    tracing::warn!(uri = %uri, view = %view, "Assigning default view");
                    if let Some(node) = self.sitemap.node_mut(id) {
                        node.set_view(Some(view.clone()));
                    }
                }
                Ok(())
            }
            MissingViewPolicy::Reject if missing.is_empty() => Ok(()),
            MissingViewPolicy::Reject => Err(BuildError::MissingViews(
                missing.into_iter().map(|(_, uri)| uri).collect(),
            )),
        }
    }

    fn check_redirects(&self) -> Result<(), BuildError> {
        let dangling: Vec<(String, String)> = self
            .sitemap
            .redirects()
            .iter()
            .filter(|(_, to)| !self.sitemap.uri_index().contains_key(*to))
            .map(|(from, to)| (from.clone(), to.clone()))
            .collect();

        if dangling.is_empty() {
            Ok(())
        } else {
            Err(BuildError::DanglingRedirects(dangling))
        }
    }
}
