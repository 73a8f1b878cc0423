//! Site navigation resolution for Waypoint.
//!
//! This crate provides:
//! - [`Forest`]: multi-root tree structure with cycle rejection
//! - [`MasterSitemapBuilder`] / [`MasterSitemap`]: the authoritative map from
//!   URI paths to views, with redirects and standard pages
//! - URI resolution on any [`Sitemap`] (exact, partial, nearest match)
//! - [`UserSitemapBuilder`] / [`UserSitemap`]: per-subject, per-locale
//!   filtered, translated and sorted copies of the master
//! - [`TreeCopy`]: the copy engine behind user sitemaps and [`NavItem`] trees
//! - [`SitemapService`]: atomic master reloads and cached derivations
//!
//! # Quick Start
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use waypoint_site::{
//!     AccessControl, CatalogTranslator, CheckOptions, DefaultPermissionChecker,
//!     FoldingCollatorFactory, Locale, MasterSitemapBuilder, Subject, UserSitemapBuilder,
//! };
//!
//! let mut builder = MasterSitemapBuilder::new();
//! builder.add_entry(
//!     "public/home",
//!     Some("HomeView".into()),
//!     "Home".into(),
//!     AccessControl::Public,
//! )?;
//! builder.add_entry(
//!     "private/inbox",
//!     Some("InboxView".into()),
//!     "Inbox".into(),
//!     AccessControl::Authenticated,
//! )?;
//! builder.add_redirect("public", "public/home");
//! let master = Arc::new(builder.build(&CheckOptions::default())?);
//!
//! let users = UserSitemapBuilder::new(
//!     master,
//!     Arc::new(DefaultPermissionChecker),
//!     Arc::new(CatalogTranslator::default()),
//!     Arc::new(FoldingCollatorFactory),
//! );
//! let sitemap = users.build(&Subject::anonymous(), &Locale::new("en"))?;
//!
//! assert!(sitemap.node_for("private/inbox").is_none());
//! assert_eq!(sitemap.redirect_for("public"), Some("public/home"));
//! # Ok(())
//! # }
//! ```

mod access;
mod collation;
mod error;
mod forest;
mod i18n;
mod master;
mod nav;
mod node;
mod order;
mod resolver;
mod service;
mod sitemap;
mod tree_copy;
mod uri;
mod user;

pub use access::{DefaultPermissionChecker, PermissionChecker, Subject};
pub use collation::{
    CollationKey, Collator, CollatorFactory, FoldingCollator, FoldingCollatorFactory,
};
pub use error::{BuildError, CopyError, ForestError, SiteError};
pub use forest::Forest;
pub use i18n::{CatalogTranslator, Locale, Translate};
pub use master::{CheckOptions, MasterSitemap, MasterSitemapBuilder, MissingViewPolicy};
pub use nav::{NavItem, NavTreeSink};
pub use node::{
    AccessControl, LabelKey, MasterNode, NodeDef, NodeId, SitemapNode, StandardPageKey, UserNode,
    ViewRef,
};
pub use order::{NodeOrder, SortDirection, SortKind};
pub use service::SitemapService;
pub use sitemap::Sitemap;
pub use tree_copy::{CopyExtension, CopySource, CopyTarget, TreeCopy};
pub use uri::{NavigationState, StrictUriHandler, UriHandler};
pub use user::{UserSitemap, UserSitemapBuilder, UserSitemapListener};
