//! Generic tree copy engine.
//!
//! [`TreeCopy`] walks a [`CopySource`] depth-first in pre-order and rebuilds
//! it in a [`CopyTarget`]. The target decides per node whether it is copied;
//! a refused node takes its whole subtree with it. Each parent's children are
//! sorted once all of them are attached, then registered
//! [`CopyExtension`]s run in order over the finished copy.
//!
//! Per-user sitemaps ([`UserSitemapBuilder`](crate::UserSitemapBuilder)) and
//! serializable navigation trees ([`NavTreeSink`](crate::NavTreeSink)) are both
//! produced through this engine.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::error::CopyError;
use crate::node::{NodeId, SitemapNode};
use crate::sitemap::Sitemap;

/// Tree that can be copied.
pub trait CopySource {
    /// Node identity within the source.
    type Key: Copy + Eq + Hash + Debug;
    /// Node payload handed to the target.
    type Node;

    /// Root keys in sibling order.
    fn copy_roots(&self) -> Vec<Self::Key>;

    /// Child keys of `key` in sibling order.
    fn copy_children(&self, key: Self::Key) -> Vec<Self::Key>;

    /// Payload of `key`.
    fn copy_node(&self, key: Self::Key) -> Option<&Self::Node>;
}

impl<N: SitemapNode> CopySource for Sitemap<N> {
    type Key = NodeId;
    type Node = Arc<N>;

    fn copy_roots(&self) -> Vec<NodeId> {
        self.forest().roots().to_vec()
    }

    fn copy_children(&self, key: NodeId) -> Vec<NodeId> {
        self.forest().children(key).to_vec()
    }

    fn copy_node(&self, key: NodeId) -> Option<&Arc<N>> {
        self.node_arc(key)
    }
}

/// Receiver of a tree copy.
///
/// Per node the engine calls [`create_node`](Self::create_node), then
/// [`set_caption`](Self::set_caption), then [`attach`](Self::attach).
pub trait CopyTarget<S: CopySource> {
    /// Handle of a node created in the target.
    type Node: Clone;

    /// Create the counterpart of a source node, or `None` to skip it and its
    /// subtree.
    fn create_node(&mut self, source: &S, key: S::Key, node: &S::Node) -> Option<Self::Node>;

    /// Attach `child` under `parent`, or as a root when `parent` is `None`.
    fn attach(&mut self, parent: Option<&Self::Node>, child: &Self::Node) -> Result<(), CopyError>;

    /// Assign the display caption of a created node.
    fn set_caption(&mut self, _node: &Self::Node, _source_node: &S::Node) {}

    /// Order the children of `parent` (roots when `None`).
    ///
    /// Called once per parent after all of its children are attached.
    fn sort_children(&mut self, _parent: Option<&Self::Node>) {}
}

/// Post-processing step run after the tree has been copied.
pub trait CopyExtension<S: CopySource, T: CopyTarget<S>> {
    /// Inspect or adjust the finished copy.
    ///
    /// `copied` maps every copied source key to its target node.
    fn apply(
        &self,
        source: &S,
        target: &mut T,
        copied: &HashMap<S::Key, T::Node>,
    ) -> Result<(), CopyError>;
}

/// Tree copy engine.
pub struct TreeCopy<S: CopySource, T: CopyTarget<S>> {
    max_depth: Option<usize>,
    extensions: Vec<Box<dyn CopyExtension<S, T>>>,
}

impl<S: CopySource, T: CopyTarget<S>> Default for TreeCopy<S, T> {
    fn default() -> Self {
        Self {
            max_depth: None,
            extensions: Vec::new(),
        }
    }
}

impl<S: CopySource, T: CopyTarget<S>> TreeCopy<S, T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy only the first `max_depth` levels (`Some(1)` copies roots only).
    #[must_use]
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Register an extension. Extensions run in registration order.
    #[must_use]
    pub fn extension(mut self, extension: impl CopyExtension<S, T> + 'static) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    /// Copy `source` into `target`.
    ///
    /// A source that reaches any node twice is rejected before the target
    /// is touched.
    pub fn copy(&self, source: &S, target: &mut T) -> Result<HashMap<S::Key, T::Node>, CopyError> {
        check_acyclic(source)?;

        let mut copied = HashMap::new();
        for root in source.copy_roots() {
            self.copy_subtree(source, target, None, root, 0, &mut copied)?;
        }
        target.sort_children(None);

        for extension in &self.extensions {
            extension.apply(source, target, &copied)?;
        }

        Ok(copied)
    }

    fn copy_subtree(
        &self,
        source: &S,
        target: &mut T,
        parent: Option<&T::Node>,
        key: S::Key,
        depth: usize,
        copied: &mut HashMap<S::Key, T::Node>,
    ) -> Result<(), CopyError> {
        if self.max_depth.is_some_and(|max| depth >= max) {
            return Ok(());
        }
        let Some(node) = source.copy_node(key) else {
            return Ok(());
        };
        let Some(copy) = target.create_node(source, key, node) else {
            return Ok(());
        };

        target.set_caption(&copy, node);
        target.attach(parent, &copy)?;
        for child in source.copy_children(key) {
            self.copy_subtree(source, target, Some(&copy), child, depth + 1, copied)?;
        }
        target.sort_children(Some(&copy));

        copied.insert(key, copy);
        Ok(())
    }
}

fn check_acyclic<S: CopySource>(source: &S) -> Result<(), CopyError> {
    let mut seen = HashSet::new();
    let mut stack = source.copy_roots();
    while let Some(key) = stack.pop() {
        if !seen.insert(key) {
            return Err(CopyError::CycleDetected(format!("{key:?}")));
        }
        stack.extend(source.copy_children(key));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Adjacency-list source: key → (name, children).
    struct Graph {
        roots: Vec<u32>,
        nodes: HashMap<u32, (String, Vec<u32>)>,
    }

    impl Graph {
        fn new(roots: &[u32], edges: &[(u32, &str, &[u32])]) -> Self {
            Self {
                roots: roots.to_vec(),
                nodes: edges
                    .iter()
                    .map(|&(k, name, children)| (k, (name.to_owned(), children.to_vec())))
                    .collect(),
            }
        }
    }

    impl CopySource for Graph {
        type Key = u32;
        type Node = String;

        fn copy_roots(&self) -> Vec<u32> {
            self.roots.clone()
        }

        fn copy_children(&self, key: u32) -> Vec<u32> {
            self.nodes.get(&key).map(|(_, c)| c.clone()).unwrap_or_default()
        }

        fn copy_node(&self, key: u32) -> Option<&String> {
            self.nodes.get(&key).map(|(name, _)| name)
        }
    }

    /// Records the calls it receives; refuses nodes named `skip*`.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl CopyTarget<Graph> for Recorder {
        type Node = String;

        fn create_node(&mut self, _source: &Graph, _key: u32, node: &String) -> Option<String> {
            self.events.push(format!("create {node}"));
            (!node.starts_with("skip")).then(|| node.clone())
        }

        fn attach(&mut self, parent: Option<&String>, child: &String) -> Result<(), CopyError> {
            let parent = parent.map_or("-", String::as_str);
            self.events.push(format!("attach {parent}/{child}"));
            Ok(())
        }

        fn set_caption(&mut self, node: &String, _source_node: &String) {
            self.events.push(format!("caption {node}"));
        }

        fn sort_children(&mut self, parent: Option<&String>) {
            self.events
                .push(format!("sort {}", parent.map_or("-", String::as_str)));
        }
    }

    struct Tag(&'static str, Rc<RefCell<Vec<&'static str>>>);

    impl CopyExtension<Graph, Recorder> for Tag {
        fn apply(
            &self,
            _source: &Graph,
            target: &mut Recorder,
            copied: &HashMap<u32, String>,
        ) -> Result<(), CopyError> {
            self.1.borrow_mut().push(self.0);
            target.events.push(format!("ext {} saw {}", self.0, copied.len()));
            Ok(())
        }
    }

    fn sample() -> Graph {
        Graph::new(&[1, 4], &[(1, "a", &[2, 3]), (2, "b", &[]), (3, "c", &[]), (4, "d", &[])])
    }

    #[test]
    fn test_copy_pre_order_with_sort_after_siblings() {
        let mut target = Recorder::default();

        let copied = TreeCopy::new().copy(&sample(), &mut target).unwrap();

        assert_eq!(copied.len(), 4);
        assert_eq!(
            target.events,
            vec![
                "create a", "caption a", "attach -/a",
                "create b", "caption b", "attach a/b", "sort b",
                "create c", "caption c", "attach a/c", "sort c",
                "sort a",
                "create d", "caption d", "attach -/d", "sort d",
                "sort -",
            ]
        );
    }

    #[test]
    fn test_refused_node_drops_subtree() {
        let graph = Graph::new(&[1], &[(1, "skip", &[2]), (2, "child", &[])]);
        let mut target = Recorder::default();

        let copied = TreeCopy::new().copy(&graph, &mut target).unwrap();

        assert!(copied.is_empty());
        assert_eq!(target.events, vec!["create skip", "sort -"]);
    }

    #[test]
    fn test_max_depth_limits_levels() {
        let mut target = Recorder::default();

        let copied = TreeCopy::new()
            .max_depth(Some(1))
            .copy(&sample(), &mut target)
            .unwrap();

        let mut keys: Vec<u32> = copied.into_keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 4]);
    }

    #[test]
    fn test_cycle_rejected_before_copy() {
        let graph = Graph::new(&[1], &[(1, "a", &[2]), (2, "b", &[1])]);
        let mut target = Recorder::default();

        let result = TreeCopy::new().copy(&graph, &mut target);

        assert!(matches!(result, Err(CopyError::CycleDetected(_))));
        assert!(target.events.is_empty());
    }

    #[test]
    fn test_shared_child_rejected() {
        let graph = Graph::new(&[1, 2], &[(1, "a", &[3]), (2, "b", &[3]), (3, "c", &[])]);

        let result = TreeCopy::new().copy(&graph, &mut Recorder::default());

        assert_eq!(result, Err(CopyError::CycleDetected("3".to_owned())));
    }

    #[test]
    fn test_extensions_run_in_order_after_copy() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut target = Recorder::default();

        TreeCopy::new()
            .extension(Tag("first", Rc::clone(&log)))
            .extension(Tag("second", Rc::clone(&log)))
            .copy(&sample(), &mut target)
            .unwrap();

        assert_eq!(*log.borrow(), vec!["first", "second"]);
        assert_eq!(target.events.last().map(String::as_str), Some("ext second saw 4"));
    }
}
