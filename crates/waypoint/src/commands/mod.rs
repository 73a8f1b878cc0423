//! CLI command implementations.

mod check;
mod resolve;
mod tree;

use std::path::PathBuf;

use clap::Args;
use waypoint_config::{CliSettings, Config};
use waypoint_site::Subject;

use crate::error::CliError;
use crate::loader::Site;

pub(crate) use check::CheckArgs;
pub(crate) use resolve::ResolveArgs;
pub(crate) use tree::TreeArgs;

/// Configuration file selection shared by every command.
#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover waypoint.toml).
    #[arg(short, long, env = "WAYPOINT_CONFIG")]
    config: Option<PathBuf>,
}

impl ConfigArgs {
    pub(crate) fn load(&self, settings: &CliSettings) -> Result<Config, CliError> {
        Ok(Config::load(self.config.as_deref(), Some(settings))?)
    }

    pub(crate) fn load_site(&self, settings: &CliSettings) -> Result<Site, CliError> {
        Site::load(self.load(settings)?)
    }
}

/// The subject and locale a user sitemap is derived for.
#[derive(Args)]
pub(crate) struct SubjectArgs {
    /// Derive for an authenticated subject.
    #[arg(short, long)]
    authenticated: bool,

    /// Role held by the subject (repeatable, implies --authenticated).
    #[arg(long = "role", value_name = "ROLE")]
    roles: Vec<String>,

    /// Permission held by the subject (repeatable, implies --authenticated).
    #[arg(long = "permission", value_name = "PERMISSION")]
    permissions: Vec<String>,

    /// Locale for labels and collation (default: navigation.default_locale).
    #[arg(short, long)]
    locale: Option<String>,
}

impl SubjectArgs {
    pub(crate) fn subject(&self) -> Subject {
        if !self.authenticated && self.roles.is_empty() && self.permissions.is_empty() {
            return Subject::anonymous();
        }
        Subject::authenticated()
            .with_roles(self.roles.iter().cloned())
            .with_permissions(self.permissions.iter().cloned())
    }

    pub(crate) fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
}
