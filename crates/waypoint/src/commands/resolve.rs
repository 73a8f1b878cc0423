//! `waypoint resolve` command implementation.

use clap::Args;
use waypoint_config::CliSettings;
use waypoint_site::{MasterNode, SitemapNode, UserNode, UserSitemap, ViewRef};

use super::{ConfigArgs, SubjectArgs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// URI to resolve, e.g. `/private/orders`.
    uri: String,

    #[command(flatten)]
    subject: SubjectArgs,

    #[command(flatten)]
    config: ConfigArgs,
}

impl ResolveArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let site = self.config.load_site(&CliSettings::default())?;
        let locale = site.locale(self.subject.locale());
        let sitemap = site.users.build(&self.subject.subject(), &locale)?;
        let master = site.master();

        output.highlight(&self.uri)?;

        if let Some(target) = master.redirect_for(&self.uri) {
            output.field("redirect", &format!("/{target}"))?;
        }
        let target = master.redirect_target_for(&self.uri);

        match master.node_for(&target) {
            Some(node) => describe_master(&output, node)?,
            None => {
                output.warning(&format!("No page at /{target}"));
                if let Some(nearest) = master.node_nearest_for(&target) {
                    output.field("nearest", &format!("/{}", master.uri(nearest)))?;
                }
                return Ok(());
            }
        }

        match sitemap.node_for(&target) {
            Some(node) => describe_user(&output, &sitemap, node)?,
            None => output.warning("Not visible to this subject"),
        }
        Ok(())
    }
}

fn describe_master(output: &Output, node: &MasterNode) -> std::io::Result<()> {
    output.field("id", &node.id().to_string())?;
    output.field("view", node.view().map_or("-", ViewRef::as_str))?;
    output.field("label key", node.label_key().as_str())?;
    output.field("access", &format!("{:?}", node.access()))?;
    if !node.roles().is_empty() {
        output.field("roles", &node.roles().join(", "))?;
    }
    Ok(())
}

fn describe_user(output: &Output, sitemap: &UserSitemap, node: &UserNode) -> std::io::Result<()> {
    output.field("label", node.label())?;
    output.field("breadcrumb", &breadcrumb(sitemap, node))?;
    let children: Vec<&str> = sitemap
        .sorted_children(Some(node.id()), sitemap.order())
        .into_iter()
        .map(UserNode::label)
        .collect();
    if !children.is_empty() {
        output.field("children", &children.join(", "))?;
    }
    Ok(())
}

/// Labels from the root down to `node`.
fn breadcrumb(sitemap: &UserSitemap, node: &UserNode) -> String {
    sitemap
        .node_chain(node.id())
        .into_iter()
        .map(UserNode::label)
        .collect::<Vec<_>>()
        .join(" > ")
}
