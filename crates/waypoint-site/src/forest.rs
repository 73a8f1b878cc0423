//! Multi-root tree container.
//!
//! [`Forest`] tracks parent/child relationships between node keys. It owns no
//! node data; [`Sitemap`](crate::Sitemap) keeps nodes in a separate table and
//! uses the forest for structure only.
//!
//! Every mutation validates before it touches any state, so a rejected call
//! leaves the forest exactly as it was. Cycles are rejected at insertion time.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::ForestError;

/// Multi-root forest of node keys.
///
/// Children and roots keep the order in which they were attached until they
/// are explicitly re-sorted with [`sort_children_by`](Self::sort_children_by).
#[derive(Clone, Debug)]
pub struct Forest<K> {
    parents: HashMap<K, Option<K>>,
    children: HashMap<K, Vec<K>>,
    roots: Vec<K>,
}

impl<K: Eq + Hash> PartialEq for Forest<K> {
    fn eq(&self, other: &Self) -> bool {
        self.roots == other.roots
            && self.parents == other.parents
            && self.children == other.children
    }
}

impl<K: Eq + Hash> Eq for Forest<K> {}

impl<K> Default for Forest<K> {
    fn default() -> Self {
        Self {
            parents: HashMap::new(),
            children: HashMap::new(),
            roots: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + Debug> Forest<K> {
    /// Create an empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// True if the forest has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// True if `key` is part of the forest.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.parents.contains_key(&key)
    }

    /// Add `key` as a new root.
    pub fn add_node(&mut self, key: K) -> Result<(), ForestError<K>> {
        if self.contains(key) {
            return Err(ForestError::DuplicateNode(key));
        }
        self.parents.insert(key, None);
        self.children.insert(key, Vec::new());
        self.roots.push(key);
        Ok(())
    }

    /// Attach `child` under `parent`.
    ///
    /// If `child` is not yet present it is added first; if it is present it is
    /// moved together with its subtree. Attaching a node under its current
    /// parent is a no-op.
    ///
    /// # Errors
    ///
    /// - [`ForestError::UnknownNode`] if `parent` is not present
    /// - [`ForestError::CycleDetected`] if `child` is `parent` or one of its ancestors
    pub fn add_child(&mut self, parent: K, child: K) -> Result<(), ForestError<K>> {
        if !self.contains(parent) {
            return Err(ForestError::UnknownNode(parent));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(ForestError::CycleDetected { parent, child });
        }

        match self.parents.get(&child).copied() {
            None => {
                self.parents.insert(child, Some(parent));
                self.children.insert(child, Vec::new());
            }
            Some(Some(current)) if current == parent => return Ok(()),
            Some(previous) => {
                self.detach(child, previous);
                self.parents.insert(child, Some(parent));
            }
        }

        self.children.entry(parent).or_default().push(child);
        Ok(())
    }

    /// Remove `key` together with its whole subtree.
    ///
    /// Returns the removed keys in pre-order, starting with `key`.
    pub fn remove_node(&mut self, key: K) -> Result<Vec<K>, ForestError<K>> {
        let Some(&parent) = self.parents.get(&key) else {
            return Err(ForestError::UnknownNode(key));
        };

        let removed = self.subtree(key);
        self.detach(key, parent);
        for k in &removed {
            self.parents.remove(k);
            self.children.remove(k);
        }

        Ok(removed)
    }

    /// Parent of `key`, `None` for roots and unknown keys.
    #[must_use]
    pub fn parent(&self, key: K) -> Option<K> {
        self.parents.get(&key).copied().flatten()
    }

    /// Children of `key` in their current order.
    #[must_use]
    pub fn children(&self, key: K) -> &[K] {
        self.children.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Root keys in their current order.
    #[must_use]
    pub fn roots(&self) -> &[K] {
        &self.roots
    }

    /// Ancestors of `key` from its root down to `key` itself.
    ///
    /// Empty if `key` is unknown.
    #[must_use]
    pub fn node_chain(&self, key: K) -> Vec<K> {
        if !self.contains(key) {
            return Vec::new();
        }

        let mut chain = vec![key];
        let mut current = self.parent(key);
        while let Some(k) = current {
            chain.push(k);
            current = self.parent(k);
        }
        chain.reverse();
        chain
    }

    /// True if `ancestor` is a strict ancestor of `key`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: K, key: K) -> bool {
        let mut current = self.parent(key);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.parent(k);
        }
        false
    }

    /// `key` and all of its descendants in pre-order.
    #[must_use]
    pub fn subtree(&self, key: K) -> Vec<K> {
        if !self.contains(key) {
            return Vec::new();
        }

        let mut result = Vec::new();
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            result.push(k);
            stack.extend(self.children(k).iter().rev());
        }
        result
    }

    /// Every key in pre-order, root by root.
    #[must_use]
    pub fn walk(&self) -> Vec<K> {
        self.roots.iter().flat_map(|&root| self.subtree(root)).collect()
    }

    /// Depth of `key` (roots are at depth 0).
    #[must_use]
    pub fn depth(&self, key: K) -> Option<usize> {
        self.contains(key).then(|| self.node_chain(key).len() - 1)
    }

    /// Reorder the children of `parent` (or the roots when `None`).
    pub fn sort_children_by<F>(&mut self, parent: Option<K>, compare: F)
    where
        F: FnMut(&K, &K) -> Ordering,
    {
        let siblings = match parent {
            Some(p) => self.children.get_mut(&p),
            None => Some(&mut self.roots),
        };
        if let Some(siblings) = siblings {
            siblings.sort_by(compare);
        }
    }

    fn detach(&mut self, key: K, parent: Option<K>) {
        let siblings = match parent {
            Some(p) => self.children.get_mut(&p),
            None => Some(&mut self.roots),
        };
        if let Some(siblings) = siblings {
            siblings.retain(|&k| k != key);
        }
    }
}
