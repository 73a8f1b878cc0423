//! Turns a loaded [`Config`] into a master sitemap and user derivation
//! settings.

use std::sync::Arc;

use waypoint_config::{
    AccessSetting, ChecksConfig, Config, DirectionSetting, MissingViewSetting, PageConfig,
    SortSetting,
};
use waypoint_site::{
    AccessControl, CatalogTranslator, CheckOptions, DefaultPermissionChecker,
    FoldingCollatorFactory, LabelKey, Locale, MasterSitemap, MasterSitemapBuilder,
    MissingViewPolicy, NodeOrder, SitemapNode, SortDirection, SortKind, StandardPageKey,
    UserSitemapBuilder, ViewRef,
};

use crate::error::CliError;

/// Everything a command needs to resolve URIs for a subject.
pub(crate) struct Site {
    pub(crate) config: Config,
    pub(crate) users: UserSitemapBuilder,
}

impl Site {
    /// Build and check the master sitemap described by `config`.
    pub(crate) fn load(config: Config) -> Result<Self, CliError> {
        let master = Arc::new(build_master(&config)?);
        tracing::info!(
            pages = config.pages.len(),
            nodes = master.len(),
            redirects = master.redirects().len(),
            "Master sitemap loaded"
        );

        let users = UserSitemapBuilder::new(
            master,
            Arc::new(DefaultPermissionChecker),
            Arc::new(translator(&config)),
            Arc::new(FoldingCollatorFactory),
        )
        .order(node_order(&config))
        .max_depth(config.navigation.max_depth);

        Ok(Self { config, users })
    }

    /// The checked master sitemap.
    pub(crate) fn master(&self) -> &MasterSitemap {
        self.users.master()
    }

    /// `requested`, or the configured default locale.
    pub(crate) fn locale(&self, requested: Option<&str>) -> Locale {
        Locale::new(requested.unwrap_or(&self.config.navigation.default_locale))
    }
}

/// Build the master sitemap from `[[pages]]`, `[redirects]` and
/// `[standard_pages]`, running the `[checks]`.
pub(crate) fn build_master(config: &Config) -> Result<MasterSitemap, CliError> {
    let mut builder = MasterSitemapBuilder::new();

    for page in &config.pages {
        let id = builder.add_entry(
            &page.path,
            page.view.as_deref().map(ViewRef::new),
            LabelKey::new(page.label_key()),
            access(page),
        )?;
        if !page.roles.is_empty() {
            builder.set_roles(id, page.roles.clone())?;
        }
        if let Some(position) = page.position {
            builder.set_position(id, position)?;
        }
    }

    for (from, to) in &config.redirects {
        builder.add_redirect(from, to);
    }

    for (name, path) in &config.standard_pages {
        let key: StandardPageKey = name.parse()?;
        let id = builder
            .sitemap()
            .node_for(path)
            .map(SitemapNode::id)
            .ok_or_else(|| {
                CliError::Validation(format!("standard_pages.{name}: no page at \"{path}\""))
            })?;
        builder.add_standard_page(key, id)?;
    }

    Ok(builder.build(&check_options(&config.checks)?)?)
}

/// Label catalogs from `[labels.<locale>]`.
pub(crate) fn translator(config: &Config) -> CatalogTranslator {
    let mut translator = CatalogTranslator::new(Locale::new(&config.navigation.default_locale));
    for (locale, entries) in &config.labels {
        translator.add_catalog(
            Locale::new(locale),
            entries.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
    }
    translator
}

/// Sibling order from `[navigation]`.
pub(crate) fn node_order(config: &Config) -> NodeOrder {
    let kind = match config.navigation.sort {
        SortSetting::Collated => SortKind::Collated,
        SortSetting::Insertion => SortKind::Insertion,
        SortSetting::Position => SortKind::Position,
    };
    let direction = match config.navigation.direction {
        DirectionSetting::Ascending => SortDirection::Ascending,
        DirectionSetting::Descending => SortDirection::Descending,
    };
    NodeOrder::new(kind, direction)
}

/// Config-side sort setting for a CLI `--sort` value.
pub(crate) fn sort_setting(kind: SortKind) -> SortSetting {
    match kind {
        SortKind::Collated => SortSetting::Collated,
        SortKind::Insertion => SortSetting::Insertion,
        SortKind::Position => SortSetting::Position,
    }
}

/// Config-side direction setting for a CLI `--direction` value.
pub(crate) fn direction_setting(direction: SortDirection) -> DirectionSetting {
    match direction {
        SortDirection::Ascending => DirectionSetting::Ascending,
        SortDirection::Descending => DirectionSetting::Descending,
    }
}

fn check_options(checks: &ChecksConfig) -> Result<CheckOptions, CliError> {
    let missing_view = match checks.missing_view {
        MissingViewSetting::Allow => MissingViewPolicy::Allow,
        MissingViewSetting::Error => MissingViewPolicy::Reject,
        MissingViewSetting::Default => {
            let view = checks.default_view.as_deref().ok_or_else(|| {
                CliError::Validation("checks.default_view is not set".to_owned())
            })?;
            MissingViewPolicy::Default(ViewRef::new(view))
        }
    };
    Ok(CheckOptions {
        missing_view,
        reject_dangling_redirects: checks.dangling_redirects,
    })
}

fn access(page: &PageConfig) -> AccessControl {
    match page.access {
        AccessSetting::Public => AccessControl::Public,
        AccessSetting::Authenticated => AccessControl::Authenticated,
        AccessSetting::Guest => AccessControl::Guest,
        AccessSetting::Permission => {
            AccessControl::Permission(page.permission.clone().unwrap_or_default())
        }
        AccessSetting::Roles => AccessControl::Roles,
    }
}
