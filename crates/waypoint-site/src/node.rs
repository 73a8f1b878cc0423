//! Sitemap node model.
//!
//! A [`MasterNode`] carries one URI segment's worth of navigation metadata and
//! is created exactly once while the master sitemap is built. A [`UserNode`]
//! wraps a master node for one (authorization, locale) view of the site and
//! adds the translated label and its collation key.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::collation::CollationKey;
use crate::error::SiteError;

/// Process-unique node identifier.
///
/// Ids are drawn from a global counter and never reused, so a node id stays
/// unambiguous across master sitemap reloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to the view rendered for a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewRef(String);

impl ViewRef {
    /// Create a view reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// View name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Locale-independent key used to look up a node's display label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelKey(String);

impl LabelKey {
    /// Create a label key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LabelKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Declarative access-control classification of a node.
///
/// Evaluated by a [`PermissionChecker`](crate::PermissionChecker), never by
/// the sitemap itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AccessControl {
    /// Visible to everyone.
    #[default]
    Public,
    /// Visible to any authenticated subject.
    Authenticated,
    /// Visible only while not authenticated (login, account requests).
    Guest,
    /// Requires the named permission.
    Permission(String),
    /// Requires one of the node's roles.
    Roles,
}

impl AccessControl {
    /// Access for a structural ancestor created on behalf of an entry with
    /// this access.
    ///
    /// Ancestors carry no roles or permission, so anything stricter than
    /// `Authenticated` would hide the entry from its own audience. `Guest`
    /// relaxes to `Public` so signed-in users still see sibling pages.
    #[must_use]
    pub fn ancestor_access(&self) -> Self {
        match self {
            Self::Public | Self::Guest => Self::Public,
            Self::Authenticated | Self::Permission(_) | Self::Roles => Self::Authenticated,
        }
    }
}

/// Semantic page roles resolved through the sitemap instead of fixed paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardPageKey {
    /// Landing page for anonymous visitors.
    PublicHome,
    /// Landing page after login.
    PrivateHome,
    /// Login form.
    Login,
    /// Logout confirmation.
    Logout,
    /// Password reset.
    ResetAccount,
    /// Credential refresh.
    RefreshAccount,
    /// Locked account recovery.
    UnlockAccount,
    /// Account registration request.
    RequestAccount,
}

impl StandardPageKey {
    /// All keys in declaration order.
    pub const ALL: [Self; 8] = [
        Self::PublicHome,
        Self::PrivateHome,
        Self::Login,
        Self::Logout,
        Self::ResetAccount,
        Self::RefreshAccount,
        Self::UnlockAccount,
        Self::RequestAccount,
    ];

    /// Snake-case name used in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PublicHome => "public_home",
            Self::PrivateHome => "private_home",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::ResetAccount => "reset_account",
            Self::RefreshAccount => "refresh_account",
            Self::UnlockAccount => "unlock_account",
            Self::RequestAccount => "request_account",
        }
    }
}

impl fmt::Display for StandardPageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StandardPageKey {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| SiteError::UnknownStandardPage(s.to_owned()))
    }
}

/// Common view over master and user nodes used by [`Sitemap`](crate::Sitemap).
pub trait SitemapNode {
    /// Node identity. A user node shares the id of its master node.
    fn id(&self) -> NodeId;

    /// The master node backing this node.
    fn master(&self) -> &MasterNode;

    /// Path component contributed by this node.
    fn uri_segment(&self) -> &str {
        &self.master().uri_segment
    }
}

/// Authoritative node of the master sitemap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MasterNode {
    id: NodeId,
    uri_segment: String,
    view: Option<ViewRef>,
    label_key: LabelKey,
    access: AccessControl,
    roles: Vec<String>,
    insertion_order: u64,
    position_index: i32,
}

impl MasterNode {
    pub(crate) fn new(def: NodeDef, insertion_order: u64) -> Self {
        Self {
            id: NodeId::next(),
            uri_segment: def.segment,
            view: def.view,
            label_key: def.label_key,
            access: def.access,
            roles: def.roles,
            insertion_order,
            position_index: def.position.unwrap_or(0),
        }
    }

    /// View rendered for this node, `None` for structural nodes.
    #[must_use]
    pub fn view(&self) -> Option<&ViewRef> {
        self.view.as_ref()
    }

    /// Label lookup key.
    #[must_use]
    pub fn label_key(&self) -> &LabelKey {
        &self.label_key
    }

    /// Access-control classification.
    #[must_use]
    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    /// Roles consulted when access is [`AccessControl::Roles`].
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Order in which the node was first created.
    #[must_use]
    pub fn insertion_order(&self) -> u64 {
        self.insertion_order
    }

    /// Explicit ordering value.
    #[must_use]
    pub fn position_index(&self) -> i32 {
        self.position_index
    }

    pub(crate) fn set_view(&mut self, view: Option<ViewRef>) {
        self.view = view;
    }

    pub(crate) fn set_label_key(&mut self, label_key: LabelKey) {
        self.label_key = label_key;
    }

    pub(crate) fn set_access(&mut self, access: AccessControl) {
        self.access = access;
    }

    pub(crate) fn set_roles(&mut self, roles: Vec<String>) {
        self.roles = roles;
    }

    pub(crate) fn set_position_index(&mut self, position_index: i32) {
        self.position_index = position_index;
    }
}

impl SitemapNode for MasterNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn master(&self) -> &MasterNode {
        self
    }
}

/// Per-user node: a master node plus its label in the active locale.
#[derive(Clone, Debug)]
pub struct UserNode {
    master: Arc<MasterNode>,
    label: String,
    collation_key: CollationKey,
}

impl UserNode {
    pub(crate) fn new(master: Arc<MasterNode>) -> Self {
        Self {
            master,
            label: String::new(),
            collation_key: CollationKey::default(),
        }
    }

    /// Translated label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Sort key derived from the label.
    #[must_use]
    pub fn collation_key(&self) -> &CollationKey {
        &self.collation_key
    }

    /// View rendered for this node.
    #[must_use]
    pub fn view(&self) -> Option<&ViewRef> {
        self.master.view()
    }

    pub(crate) fn set_label(&mut self, label: String, collation_key: CollationKey) {
        self.label = label;
        self.collation_key = collation_key;
    }
}

impl SitemapNode for UserNode {
    fn id(&self) -> NodeId {
        self.master.id
    }

    fn master(&self) -> &MasterNode {
        &self.master
    }
}

/// Definition of a master node, consumed by
/// [`MasterSitemapBuilder`](crate::MasterSitemapBuilder).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeDef {
    segment: String,
    view: Option<ViewRef>,
    label_key: LabelKey,
    access: AccessControl,
    roles: Vec<String>,
    position: Option<i32>,
}

impl NodeDef {
    /// Public, view-less node with the given segment and label key.
    pub fn new(segment: impl Into<String>, label_key: impl Into<LabelKey>) -> Self {
        Self {
            segment: segment.into(),
            view: None,
            label_key: label_key.into(),
            access: AccessControl::Public,
            roles: Vec::new(),
            position: None,
        }
    }

    /// Set the view.
    #[must_use]
    pub fn view(mut self, view: impl Into<ViewRef>) -> Self {
        self.view = Some(view.into());
        self
    }

    /// Set the access classification.
    #[must_use]
    pub fn access(mut self, access: AccessControl) -> Self {
        self.access = access;
        self
    }

    /// Set the roles list.
    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Set the explicit position index.
    #[must_use]
    pub fn position(mut self, position: i32) -> Self {
        self.position = Some(position);
        self
    }

    pub(crate) fn segment(&self) -> &str {
        &self.segment
    }
}
