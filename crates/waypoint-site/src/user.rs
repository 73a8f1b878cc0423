//! Per-user sitemap derivation.
//!
//! A [`UserSitemap`] is a filtered, translated and sorted copy of the master
//! sitemap for one subject and locale. It is produced by copying the master
//! with [`TreeCopy`] into a sitemap sink that:
//!
//! 1. drops every node the [`PermissionChecker`] denies, with its subtree;
//! 2. labels each copied node through [`Translate`] and keys it with the
//!    locale's [`Collator`];
//! 3. sorts siblings by the configured [`NodeOrder`];
//! 4. re-derives standard pages and redirects, omitting those whose target
//!    was filtered out.
//!
//! User nodes keep the id of their master node.

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::access::{PermissionChecker, Subject};
use crate::collation::{CollationKey, Collator, CollatorFactory};
use crate::error::CopyError;
use crate::i18n::{Locale, Translate};
use crate::master::MasterSitemap;
use crate::nav::{NavItem, NavTreeSink};
use crate::node::{LabelKey, MasterNode, NodeId, SitemapNode, UserNode};
use crate::order::{NodeOrder, SortKind};
use crate::sitemap::Sitemap;
use crate::tree_copy::{CopyExtension, CopyTarget, TreeCopy};

/// Observer of user sitemap changes.
pub trait UserSitemapListener: Send + Sync {
    /// Labels were recomputed for a new locale.
    fn labels_changed(&self, _sitemap: &UserSitemap) {}

    /// Membership or sibling order changed.
    fn structure_changed(&self, _sitemap: &UserSitemap) {}
}

/// Derives [`UserSitemap`]s from a master sitemap.
#[derive(Clone)]
pub struct UserSitemapBuilder {
    master: Arc<MasterSitemap>,
    checker: Arc<dyn PermissionChecker>,
    translator: Arc<dyn Translate>,
    collators: Arc<dyn CollatorFactory>,
    order: NodeOrder,
    max_depth: Option<usize>,
}

impl UserSitemapBuilder {
    /// Create a builder with collated ascending order and no depth limit.
    #[must_use]
    pub fn new(
        master: Arc<MasterSitemap>,
        checker: Arc<dyn PermissionChecker>,
        translator: Arc<dyn Translate>,
        collators: Arc<dyn CollatorFactory>,
    ) -> Self {
        Self {
            master,
            checker,
            translator,
            collators,
            order: NodeOrder::default(),
            max_depth: None,
        }
    }

    /// Set the sibling order.
    #[must_use]
    pub fn order(mut self, order: NodeOrder) -> Self {
        self.order = order;
        self
    }

    /// Copy only the first `max_depth` levels.
    #[must_use]
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Replace the master sitemap, keeping every other setting.
    #[must_use]
    pub fn with_master(mut self, master: Arc<MasterSitemap>) -> Self {
        self.master = master;
        self
    }

    /// Master sitemap derivations are copied from.
    #[must_use]
    pub fn master(&self) -> &Arc<MasterSitemap> {
        &self.master
    }

    /// Derive the sitemap `subject` sees in `locale`.
    pub fn build(&self, subject: &Subject, locale: &Locale) -> Result<UserSitemap, CopyError> {
        let sitemap = self.derive(subject, locale)?;
        Ok(UserSitemap {
            sitemap,
            builder: self.clone(),
            subject: subject.clone(),
            locale: locale.clone(),
            listeners: Vec::new(),
        })
    }

    fn derive(&self, subject: &Subject, locale: &Locale) -> Result<Sitemap<UserNode>, CopyError> {
        let mut sink = SitemapSink {
            sitemap: Sitemap::new(self.master.uri_handler_arc()),
            pending: HashMap::new(),
            subject: subject.clone(),
            checker: Arc::clone(&self.checker),
            translator: Arc::clone(&self.translator),
            collator: self.collators.collator(locale),
            locale: locale.clone(),
            order: self.order,
        };

        TreeCopy::new()
            .max_depth(self.max_depth)
            .extension(DeriveIndices)
            .copy(self.master.as_ref(), &mut sink)?;

        tracing::debug!(
            subject = %subject.fingerprint(),
            locale = %locale,
            nodes = sink.sitemap.len(),
            hidden = self.master.len() - sink.sitemap.len(),
            "User sitemap derived"
        );
        Ok(sink.sitemap)
    }
}

/// Sitemap derived for one subject and locale.
///
/// Dereferences to [`Sitemap<UserNode>`], so every resolver operation is
/// available directly.
pub struct UserSitemap {
    sitemap: Sitemap<UserNode>,
    builder: UserSitemapBuilder,
    subject: Subject,
    locale: Locale,
    listeners: Vec<Arc<dyn UserSitemapListener>>,
}

impl fmt::Debug for UserSitemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSitemap")
            .field("sitemap", &self.sitemap)
            .field("subject", &self.subject)
            .field("locale", &self.locale)
            .field("order", &self.builder.order)
            .finish_non_exhaustive()
    }
}

impl Deref for UserSitemap {
    type Target = Sitemap<UserNode>;

    fn deref(&self) -> &Self::Target {
        &self.sitemap
    }
}

impl UserSitemap {
    /// Subject this sitemap was derived for.
    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Active locale.
    #[must_use]
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Sibling order applied to the tree.
    #[must_use]
    pub fn order(&self) -> NodeOrder {
        self.builder.order
    }

    /// Master sitemap this sitemap was derived from.
    #[must_use]
    pub fn master(&self) -> &Arc<MasterSitemap> {
        &self.builder.master
    }

    /// Register a change listener.
    pub fn add_listener(&mut self, listener: Arc<dyn UserSitemapListener>) {
        self.listeners.push(listener);
    }

    /// Recompute every label and collation key for `locale`.
    ///
    /// Membership and URIs are unchanged. Under collated order siblings are
    /// re-sorted by the new keys, and `structure_changed` follows
    /// `labels_changed` when that moved any sibling.
    pub fn set_locale(&mut self, locale: Locale) {
        let collator = self.builder.collators.collator(&locale);
        for id in self.sitemap.forest().walk() {
            if let Some(node) = self.sitemap.node_mut(id) {
                let (label, key) = caption(
                    self.builder.translator.as_ref(),
                    collator.as_ref(),
                    node.master().label_key(),
                    &locale,
                );
                node.set_label(label, key);
            }
        }
        self.locale = locale;
        let mut reordered = false;
        if self.builder.order.kind == SortKind::Collated {
            let before = self.sitemap.forest().clone();
            self.resort();
            reordered = *self.sitemap.forest() != before;
        }

        tracing::debug!(locale = %self.locale, reordered, "User sitemap relabeled");
        self.notify(|listener, sitemap| listener.labels_changed(sitemap));
        if reordered {
            self.notify(|listener, sitemap| listener.structure_changed(sitemap));
        }
    }

    /// Re-derive the tree for a changed subject.
    pub fn rebuild(&mut self, subject: Subject) -> Result<(), CopyError> {
        self.sitemap = self.builder.derive(&subject, &self.locale)?;
        self.subject = subject;
        self.notify(|listener, sitemap| listener.structure_changed(sitemap));
        Ok(())
    }

    /// Change the sibling order and re-sort the tree.
    pub fn set_order(&mut self, order: NodeOrder) {
        self.builder.order = order;
        self.resort();
        self.notify(|listener, sitemap| listener.structure_changed(sitemap));
    }

    /// Children of `parent` (roots when `None`) sorted by `order`.
    ///
    /// Leaves the tree's own order untouched.
    #[must_use]
    pub fn sorted_children(&self, parent: Option<NodeId>, order: NodeOrder) -> Vec<&UserNode> {
        let mut nodes = match parent {
            Some(id) => self.sitemap.children(id),
            None => self.sitemap.roots(),
        };
        order.sort(&mut nodes);
        nodes
    }

    /// Roots sorted by `order`.
    #[must_use]
    pub fn sorted_roots(&self, order: NodeOrder) -> Vec<&UserNode> {
        self.sorted_children(None, order)
    }

    /// Flat pre-order listing of the subtree at `root`, siblings sorted by
    /// `order`. Empty if `root` is not visible.
    #[must_use]
    pub fn menu(&self, root: NodeId, order: NodeOrder) -> Vec<&UserNode> {
        let Some(node) = self.sitemap.node(root) else {
            return Vec::new();
        };

        let mut items = vec![node];
        for child in self.sorted_children(Some(root), order) {
            items.extend(self.menu(child.id(), order));
        }
        items
    }

    /// Navigation tree for UI widgets, in the tree's sibling order.
    pub fn navigation(&self) -> Result<Vec<NavItem>, CopyError> {
        let mut sink = NavTreeSink::new();
        TreeCopy::new().copy(&self.sitemap, &mut sink)?;
        Ok(sink.into_items())
    }

    fn resort(&mut self) {
        let order = self.builder.order;
        let parents = self.sitemap.forest().walk();
        self.sitemap
            .sort_children_by(None, |a, b| order.compare(a, b));
        for parent in parents {
            self.sitemap
                .sort_children_by(Some(parent), |a, b| order.compare(a, b));
        }
    }

    fn notify<F>(&self, event: F)
    where
        F: Fn(&dyn UserSitemapListener, &UserSitemap),
    {
        for listener in &self.listeners {
            event(listener.as_ref(), self);
        }
    }
}

fn caption(
    translator: &dyn Translate,
    collator: &dyn Collator,
    label_key: &LabelKey,
    locale: &Locale,
) -> (String, CollationKey) {
    let label = translator.translate(label_key, locale);
    let key = collator.key(&label);
    (label, key)
}

/// Copy target building a `Sitemap<UserNode>`.
///
/// Nodes are staged in `pending` between creation and attachment.
struct SitemapSink {
    sitemap: Sitemap<UserNode>,
    pending: HashMap<NodeId, UserNode>,
    subject: Subject,
    checker: Arc<dyn PermissionChecker>,
    translator: Arc<dyn Translate>,
    collator: Arc<dyn Collator>,
    locale: Locale,
    order: NodeOrder,
}

impl CopyTarget<MasterSitemap> for SitemapSink {
    type Node = NodeId;

    fn create_node(
        &mut self,
        _source: &MasterSitemap,
        key: NodeId,
        node: &Arc<MasterNode>,
    ) -> Option<NodeId> {
        if !self
            .checker
            .is_allowed(node.access(), node.roles(), &self.subject)
        {
            return None;
        }
        self.pending.insert(key, UserNode::new(Arc::clone(node)));
        Some(key)
    }

    fn attach(&mut self, parent: Option<&NodeId>, child: &NodeId) -> Result<(), CopyError> {
        let Some(node) = self.pending.remove(child) else {
            return Ok(());
        };
        match parent {
            Some(&parent) => self.sitemap.insert_child(parent, node)?,
            None => self.sitemap.insert_root(node)?,
        };
        Ok(())
    }

    fn set_caption(&mut self, node: &NodeId, source_node: &Arc<MasterNode>) {
        if let Some(user) = self.pending.get_mut(node) {
            let (label, key) = caption(
                self.translator.as_ref(),
                self.collator.as_ref(),
                source_node.label_key(),
                &self.locale,
            );
            user.set_label(label, key);
        }
    }

    fn sort_children(&mut self, parent: Option<&NodeId>) {
        let order = self.order;
        self.sitemap
            .sort_children_by(parent.copied(), |a, b| order.compare(a, b));
    }
}

/// Re-derives standard pages and redirects over the filtered copy.
struct DeriveIndices;

impl CopyExtension<MasterSitemap, SitemapSink> for DeriveIndices {
    fn apply(
        &self,
        source: &MasterSitemap,
        target: &mut SitemapSink,
        copied: &HashMap<NodeId, NodeId>,
    ) -> Result<(), CopyError> {
        for (key, node) in source.standard_pages() {
            match copied.get(&node.id()) {
                Some(&id) => target.sitemap.insert_standard_page(key, id)?,
                None => tracing::debug!(page = %key, "Standard page not visible, omitted"),
            }
        }

        for (from, to) in source.redirects() {
            if target.sitemap.node_for(to).is_some() {
                target.sitemap.insert_redirect(from, to);
            } else {
                tracing::debug!(from = %from, to = %to, "Dropping dangling redirect");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::access::DefaultPermissionChecker;
    use crate::collation::FoldingCollatorFactory;
    use crate::i18n::CatalogTranslator;
    use crate::master::MasterSitemapBuilder;
    use crate::node::{AccessControl, NodeDef, StandardPageKey};
    use crate::order::SortDirection;

    fn translator() -> CatalogTranslator {
        let mut translator = CatalogTranslator::new(Locale::new("en"));
        translator.add_catalog(
            Locale::new("en"),
            [
                ("Public_Home", "Welcome"),
                ("Log_In", "Log in"),
                ("Home", "Home"),
                ("Fruit_A", "Apple"),
                ("Fruit_B", "Banana"),
            ],
        );
        translator.add_catalog(
            Locale::new("de"),
            [
                ("Public_Home", "Willkommen"),
                ("Log_In", "Anmelden"),
                ("Home", "Startseite"),
                ("Fruit_A", "Zitrone"),
                ("Fruit_B", "Birne"),
            ],
        );
        translator
    }

    /// `public`, `login` (guest only), `private` (authenticated, redirects to
    /// `private/home`), `private/home`, `private/admin` (role `admin`).
    fn master() -> Arc<MasterSitemap> {
        let mut builder = MasterSitemapBuilder::new();
        let public = builder
            .add_node(NodeDef::new("public", "Public_Home").view("PublicView"))
            .unwrap();
        let login = builder
            .add_node(
                NodeDef::new("login", "Log_In")
                    .view("LoginView")
                    .access(AccessControl::Guest),
            )
            .unwrap();
        let home = builder
            .add_entry(
                "private/home",
                Some("HomeView".into()),
                "Home".into(),
                AccessControl::Authenticated,
            )
            .unwrap();
        let private = builder.sitemap().node_for("private").unwrap().id();
        builder
            .add_child(
                private,
                NodeDef::new("admin", "Admin")
                    .view("AdminView")
                    .access(AccessControl::Roles)
                    .roles(["admin"]),
            )
            .unwrap();
        builder.add_redirect("private", "private/home");
        builder.add_redirect("old", "public");
        builder
            .add_standard_page(StandardPageKey::PublicHome, public)
            .unwrap();
        builder
            .add_standard_page(StandardPageKey::PrivateHome, home)
            .unwrap();
        builder
            .add_standard_page(StandardPageKey::Login, login)
            .unwrap();
        Arc::new(builder.build_unchecked())
    }

    fn builder_for(master: Arc<MasterSitemap>) -> UserSitemapBuilder {
        UserSitemapBuilder::new(
            master,
            Arc::new(DefaultPermissionChecker),
            Arc::new(translator()),
            Arc::new(FoldingCollatorFactory),
        )
        .order(NodeOrder::ascending(SortKind::Insertion))
    }

    fn derive(subject: &Subject, locale: &str) -> UserSitemap {
        builder_for(master())
            .build(subject, &Locale::new(locale))
            .unwrap()
    }

    #[derive(Default)]
    struct Counter {
        labels: AtomicUsize,
        structure: AtomicUsize,
    }

    impl UserSitemapListener for Counter {
        fn labels_changed(&self, _sitemap: &UserSitemap) {
            self.labels.fetch_add(1, Ordering::SeqCst);
        }

        fn structure_changed(&self, _sitemap: &UserSitemap) {
            self.structure.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_anonymous_sees_public_and_guest_pages() {
        let sitemap = derive(&Subject::anonymous(), "en");

        assert!(sitemap.node_for("public").is_some());
        assert!(sitemap.node_for("login").is_some());
        assert!(sitemap.node_for("private").is_none());
        assert!(sitemap.node_for("private/home").is_none());
    }

    #[test]
    fn test_authenticated_loses_guest_pages() {
        let sitemap = derive(&Subject::authenticated(), "en");

        assert!(sitemap.node_for("login").is_none());
        assert!(sitemap.node_for("private/home").is_some());
        assert!(sitemap.node_for("private/admin").is_none());
    }

    #[test]
    fn test_roles_grant_access() {
        let sitemap = derive(&Subject::authenticated().with_roles(["admin"]), "en");

        assert!(sitemap.node_for("private/admin").is_some());
    }

    #[test]
    fn test_filtered_parent_hides_subtree() {
        let master = master();
        let sitemap = builder_for(Arc::clone(&master))
            .build(&Subject::anonymous().with_roles(["admin"]), &Locale::new("en"))
            .unwrap();

        assert!(master.node_for("private/admin").is_some());
        assert!(sitemap.node_for("private/admin").is_none());
    }

    #[test]
    fn test_user_nodes_keep_master_ids() {
        let master = master();
        let sitemap = builder_for(Arc::clone(&master))
            .build(&Subject::authenticated(), &Locale::new("en"))
            .unwrap();

        for node in sitemap.nodes() {
            let uri = sitemap.uri(node);
            assert_eq!(master.node_for(&uri).map(SitemapNode::id), Some(node.id()));
        }
    }

    #[test]
    fn test_uri_round_trip_on_user_sitemap() {
        let sitemap = derive(&Subject::authenticated().with_roles(["admin"]), "en");

        for node in sitemap.nodes() {
            let uri = sitemap.uri(node);
            assert_eq!(sitemap.node_for(&uri).map(SitemapNode::id), Some(node.id()));
        }
    }

    #[test]
    fn test_dangling_redirect_dropped() {
        let anonymous = derive(&Subject::anonymous(), "en");
        let user = derive(&Subject::authenticated(), "en");

        assert_eq!(anonymous.redirect_for("private"), None);
        assert_eq!(anonymous.redirect_for("old"), Some("public"));
        assert_eq!(user.redirect_for("private"), Some("private/home"));
    }

    #[test]
    fn test_standard_page_omitted_after_filtering() {
        let anonymous = derive(&Subject::anonymous(), "en");
        let user = derive(&Subject::authenticated(), "en");

        assert!(anonymous.standard_page_node(StandardPageKey::PrivateHome).is_none());
        assert_eq!(
            anonymous.standard_page_uri(StandardPageKey::Login).as_deref(),
            Some("login")
        );
        assert_eq!(
            user.standard_page_uri(StandardPageKey::PrivateHome).as_deref(),
            Some("private/home")
        );
        assert!(user.standard_page_node(StandardPageKey::Login).is_none());
    }

    #[test]
    fn test_labels_translated() {
        let en = derive(&Subject::anonymous(), "en");
        let de = derive(&Subject::anonymous(), "de-AT");

        assert_eq!(en.node_for("public").unwrap().label(), "Welcome");
        assert_eq!(de.node_for("public").unwrap().label(), "Willkommen");
    }

    #[test]
    fn test_structural_node_label_falls_back_to_segment() {
        let sitemap = derive(&Subject::authenticated(), "en");

        assert_eq!(sitemap.node_for("private").unwrap().label(), "private");
    }

    #[test]
    fn test_set_locale_relabels_without_structural_change() {
        let mut sitemap = derive(&Subject::anonymous(), "en");
        let counter = Arc::new(Counter::default());
        sitemap.add_listener(Arc::clone(&counter) as Arc<dyn UserSitemapListener>);
        let forest_before = sitemap.forest().clone();

        sitemap.set_locale(Locale::new("de"));

        assert_eq!(sitemap.forest(), &forest_before);
        assert_eq!(sitemap.node_for("login").unwrap().label(), "Anmelden");
        assert_eq!(sitemap.locale(), &Locale::new("de"));
        assert_eq!(counter.labels.load(Ordering::SeqCst), 1);
        assert_eq!(counter.structure.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_set_locale_resorts_collated_siblings() {
        let mut builder = MasterSitemapBuilder::new();
        builder.add_node(NodeDef::new("a", "Fruit_A")).unwrap();
        builder.add_node(NodeDef::new("b", "Fruit_B")).unwrap();
        let mut sitemap = builder_for(Arc::new(builder.build_unchecked()))
            .order(NodeOrder::ascending(SortKind::Collated))
            .build(&Subject::anonymous(), &Locale::new("en"))
            .unwrap();
        let roots = |s: &UserSitemap| -> Vec<String> {
            s.roots().iter().map(|n| n.uri_segment().to_owned()).collect()
        };

        let counter = Arc::new(Counter::default());
        sitemap.add_listener(Arc::clone(&counter) as Arc<dyn UserSitemapListener>);

        assert_eq!(roots(&sitemap), vec!["a", "b"]);

        sitemap.set_locale(Locale::new("de"));

        assert_eq!(roots(&sitemap), vec!["b", "a"]);
        assert_eq!(counter.labels.load(Ordering::SeqCst), 1);
        assert_eq!(counter.structure.load(Ordering::SeqCst), 1);

        sitemap.set_locale(Locale::new("de-AT"));

        assert_eq!(roots(&sitemap), vec!["b", "a"]);
        assert_eq!(counter.labels.load(Ordering::SeqCst), 2);
        assert_eq!(counter.structure.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rebuild_changes_membership() {
        let mut sitemap = derive(&Subject::anonymous(), "en");
        let counter = Arc::new(Counter::default());
        sitemap.add_listener(Arc::clone(&counter) as Arc<dyn UserSitemapListener>);

        sitemap.rebuild(Subject::authenticated()).unwrap();

        assert!(sitemap.node_for("private/home").is_some());
        assert!(sitemap.node_for("login").is_none());
        assert!(sitemap.subject().is_authenticated());
        assert_eq!(counter.structure.load(Ordering::SeqCst), 1);
        assert_eq!(counter.labels.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_sorted_roots_by_each_kind() {
        let mut builder = MasterSitemapBuilder::new();
        builder
            .add_node(NodeDef::new("login", "login").position(8))
            .unwrap();
        builder
            .add_node(NodeDef::new("publicHome", "publicHome").position(6))
            .unwrap();
        builder.add_node(NodeDef::new("a", "a").position(5)).unwrap();
        let sitemap = builder_for(Arc::new(builder.build_unchecked()))
            .build(&Subject::anonymous(), &Locale::new("en"))
            .unwrap();
        let segments = |order: NodeOrder| -> Vec<String> {
            sitemap
                .sorted_roots(order)
                .iter()
                .map(|n| n.uri_segment().to_owned())
                .collect()
        };

        assert_eq!(
            segments(NodeOrder::ascending(SortKind::Collated)),
            vec!["a", "login", "publicHome"]
        );
        assert_eq!(
            segments(NodeOrder::ascending(SortKind::Insertion)),
            vec!["login", "publicHome", "a"]
        );
        assert_eq!(
            segments(NodeOrder::ascending(SortKind::Position)),
            vec!["a", "publicHome", "login"]
        );
    }

    #[test]
    fn test_set_order_resorts_tree() {
        let mut sitemap = derive(&Subject::anonymous(), "en");
        let counter = Arc::new(Counter::default());
        sitemap.add_listener(Arc::clone(&counter) as Arc<dyn UserSitemapListener>);

        sitemap.set_order(NodeOrder::new(SortKind::Insertion, SortDirection::Descending));

        let segments: Vec<&str> = sitemap.roots().iter().map(|n| n.uri_segment()).collect();
        assert_eq!(segments, vec!["login", "public"]);
        assert_eq!(counter.structure.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_menu_lists_subtree_pre_order() {
        let sitemap = derive(&Subject::authenticated().with_roles(["admin"]), "en");
        let private = sitemap.node_for("private").unwrap().id();

        let menu: Vec<String> = sitemap
            .menu(private, NodeOrder::new(SortKind::Insertion, SortDirection::Descending))
            .iter()
            .map(|n| sitemap.uri(n))
            .collect();

        assert_eq!(menu, vec!["private", "private/admin", "private/home"]);
    }

    #[test]
    fn test_menu_of_hidden_node_is_empty() {
        let master = master();
        let private = master.node_for("private").unwrap().id();
        let sitemap = builder_for(master)
            .build(&Subject::anonymous(), &Locale::new("en"))
            .unwrap();

        assert!(sitemap.menu(private, NodeOrder::default()).is_empty());
    }

    #[test]
    fn test_navigation_tree() {
        let sitemap = derive(&Subject::authenticated(), "en");

        let nav = sitemap.navigation().unwrap();

        assert_eq!(nav.len(), 2);
        assert_eq!(nav[0].title, "Welcome");
        assert_eq!(nav[1].path, "private");
        assert_eq!(nav[1].view, None);
        assert_eq!(nav[1].children[0].path, "private/home");
        assert_eq!(nav[1].children[0].view.as_deref(), Some("HomeView"));
    }

    #[test]
    fn test_navigation_serializes() {
        let sitemap = derive(&Subject::anonymous(), "en");

        let json = serde_json::to_value(sitemap.navigation().unwrap()).unwrap();

        assert_eq!(
            json,
            serde_json::json!([
                { "title": "Welcome", "path": "public", "view": "PublicView" },
                { "title": "Log in", "path": "login", "view": "LoginView" },
            ])
        );
    }

    #[test]
    fn test_max_depth_limits_derivation() {
        let sitemap = builder_for(master())
            .max_depth(Some(1))
            .build(&Subject::authenticated(), &Locale::new("en"))
            .unwrap();

        assert!(sitemap.node_for("private").is_some());
        assert!(sitemap.node_for("private/home").is_none());
        assert_eq!(sitemap.redirect_for("private"), None);
    }
}
