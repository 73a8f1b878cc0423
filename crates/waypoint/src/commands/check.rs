//! `waypoint check` command implementation.

use clap::Args;
use waypoint_config::CliSettings;
use waypoint_site::{MasterSitemap, StandardPageKey};

use super::ConfigArgs;
use crate::error::CliError;
use crate::loader::Site;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    config: ConfigArgs,
}

impl CheckArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.config.load(&CliSettings::default())?;
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }
        let site = Site::load(config)?;
        let master = site.master();

        for key in unconfigured_standard_pages(master) {
            output.warning(&format!("Standard page not configured: {key}"));
        }

        output.success(&format!(
            "Sitemap OK: {} nodes, {} roots, {} redirects",
            master.len(),
            master.roots().len(),
            master.redirects().len()
        ));
        Ok(())
    }
}

fn unconfigured_standard_pages(master: &MasterSitemap) -> Vec<StandardPageKey> {
    StandardPageKey::ALL
        .into_iter()
        .filter(|&key| master.standard_page_node(key).is_none())
        .collect()
}
