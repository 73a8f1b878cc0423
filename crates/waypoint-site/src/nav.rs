//! Serializable navigation trees for UI widgets.

use serde::Serialize;

use crate::error::CopyError;
use crate::node::{NodeId, UserNode};
use crate::sitemap::Sitemap;
use crate::tree_copy::CopyTarget;

/// Navigation item with children for a UI tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Translated label.
    pub title: String,
    /// Navigable path without leading slash.
    pub path: String,
    /// View rendered for the item, absent for structural items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    /// Child navigation items.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

/// [`CopyTarget`] turning a user sitemap into [`NavItem`] trees.
///
/// Keeps the source's sibling order.
#[derive(Debug, Default)]
pub struct NavTreeSink {
    items: Vec<NavItem>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl NavTreeSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the collected items into trees.
    #[must_use]
    pub fn into_items(mut self) -> Vec<NavItem> {
        let roots = std::mem::take(&mut self.roots);
        roots.into_iter().map(|root| self.assemble(root)).collect()
    }

    fn assemble(&mut self, index: usize) -> NavItem {
        let mut item = std::mem::take(&mut self.items[index]);
        let children = std::mem::take(&mut self.children[index]);
        item.children = children
            .into_iter()
            .map(|child| self.assemble(child))
            .collect();
        item
    }
}

impl CopyTarget<Sitemap<UserNode>> for NavTreeSink {
    type Node = usize;

    fn create_node(
        &mut self,
        source: &Sitemap<UserNode>,
        _key: NodeId,
        node: &std::sync::Arc<UserNode>,
    ) -> Option<usize> {
        self.items.push(NavItem {
            title: node.label().to_owned(),
            path: source.uri(node),
            view: node.view().map(|view| view.as_str().to_owned()),
            children: Vec::new(),
        });
        self.children.push(Vec::new());
        Some(self.items.len() - 1)
    }

    fn attach(&mut self, parent: Option<&usize>, child: &usize) -> Result<(), CopyError> {
        match parent {
            Some(&parent) => self.children[parent].push(*child),
            None => self.roots.push(*child),
        }
        Ok(())
    }
}
