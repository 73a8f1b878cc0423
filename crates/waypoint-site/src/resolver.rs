//! URI resolution over a [`Sitemap`].
//!
//! All operations are pure reads and work the same on master and user
//! sitemaps. A miss is an empty result, never an error.

use crate::node::{NodeId, SitemapNode, StandardPageKey};
use crate::sitemap::Sitemap;
use crate::uri::NavigationState;

impl<N: SitemapNode> Sitemap<N> {
    /// Exact lookup of a path.
    ///
    /// The path is normalized first, so `"/a/b/"` and `"a/b"` are the same.
    #[must_use]
    pub fn node_for(&self, uri: &str) -> Option<&N> {
        let key = self.normalize(uri);
        self.uri_index().get(&key).and_then(|&id| self.node(id))
    }

    /// Exact lookup of a navigation state's virtual page.
    #[must_use]
    pub fn node_for_state(&self, state: &NavigationState) -> Option<&N> {
        // The virtual page is already decoded; encode it back instead of
        // decoding twice.
        let segments: Vec<String> = state.virtual_page.split('/').map(str::to_owned).collect();
        let key = self.uri_handler().path(&segments);
        self.uri_index().get(&key).and_then(|&id| self.node(id))
    }

    /// Walk from the roots matching one segment per level.
    ///
    /// Matching is exact and case-sensitive; siblings are visited in sibling
    /// order. When a segment has no match, `allow_partial` returns the chain
    /// matched so far (possibly empty), otherwise the result is empty.
    #[must_use]
    pub fn node_chain_for_segments<S: AsRef<str>>(
        &self,
        segments: &[S],
        allow_partial: bool,
    ) -> Vec<&N> {
        let mut chain = Vec::with_capacity(segments.len());
        let mut level = self.forest().roots();

        for segment in segments {
            let segment = segment.as_ref();
            let found = level.iter().find_map(|&id| {
                self.node(id)
                    .filter(|node| node.uri_segment() == segment)
                    .map(|node| (id, node))
            });

            match found {
                Some((id, node)) => {
                    chain.push(node);
                    level = self.forest().children(id);
                }
                None if allow_partial => return chain,
                None => return Vec::new(),
            }
        }

        chain
    }

    /// [`node_chain_for_segments`](Self::node_chain_for_segments) for a raw path.
    #[must_use]
    pub fn node_chain_for_uri(&self, uri: &str, allow_partial: bool) -> Vec<&N> {
        let segments = self.uri_handler().segments(uri);
        self.node_chain_for_segments(&segments, allow_partial)
    }

    /// Deepest node matched by a path, used as a fallback for unknown paths.
    #[must_use]
    pub fn node_nearest_for(&self, uri: &str) -> Option<&N> {
        self.node_chain_for_uri(uri, true).pop()
    }

    /// Full path of `node`: its chain's segments, encoded and joined with `/`.
    ///
    /// `node_for(&uri(node))` always returns `node`.
    #[must_use]
    pub fn uri(&self, node: &N) -> String {
        self.uri_of(node.id())
    }

    /// Full path of the node with `id`, `None` if the node is unknown.
    #[must_use]
    pub fn uri_for_id(&self, id: NodeId) -> Option<String> {
        self.contains(id).then(|| self.uri_of(id))
    }

    /// Redirect target for `page`, one hop only.
    ///
    /// A target that is itself redirected is returned as is; chains are never
    /// followed.
    #[must_use]
    pub fn redirect_for(&self, page: &str) -> Option<&str> {
        let key = self.normalize(page);
        self.redirects().get(&key).map(String::as_str)
    }

    /// The path to navigate to for `page`: its redirect target, or the
    /// normalized path itself when it is not redirected.
    #[must_use]
    pub fn redirect_target_for(&self, page: &str) -> String {
        self.redirect_for(page)
            .map_or_else(|| self.normalize(page), str::to_owned)
    }

    /// Node registered for a standard page.
    #[must_use]
    pub fn standard_page_node(&self, key: StandardPageKey) -> Option<&N> {
        self.standard_page_id(key).and_then(|id| self.node(id))
    }

    /// Path of the node registered for a standard page.
    #[must_use]
    pub fn standard_page_uri(&self, key: StandardPageKey) -> Option<String> {
        self.standard_page_id(key).map(|id| self.uri_of(id))
    }
}
