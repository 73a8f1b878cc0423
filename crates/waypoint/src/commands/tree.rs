//! `waypoint tree` command implementation.

use clap::Args;
use waypoint_config::CliSettings;
use waypoint_site::{
    NavItem, SitemapNode, SortDirection, SortKind, UserNode, UserSitemap, ViewRef,
};

use super::{ConfigArgs, SubjectArgs};
use crate::error::CliError;
use crate::loader;
use crate::output::Output;

/// Arguments for the tree command.
#[derive(Args)]
pub(crate) struct TreeArgs {
    /// Only print the subtree at this URI.
    root: Option<String>,

    /// Sibling sort: collated, insertion or position (overrides config).
    #[arg(long)]
    sort: Option<SortKind>,

    /// Sort direction: ascending or descending (overrides config).
    #[arg(long)]
    direction: Option<SortDirection>,

    /// Copy only this many levels (overrides config).
    #[arg(long)]
    max_depth: Option<usize>,

    /// Print the navigation tree as JSON.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    subject: SubjectArgs,

    #[command(flatten)]
    config: ConfigArgs,
}

impl TreeArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let settings = CliSettings {
            sort: self.sort.map(loader::sort_setting),
            direction: self.direction.map(loader::direction_setting),
            max_depth: self.max_depth,
            ..CliSettings::default()
        };
        let site = self.config.load_site(&settings)?;
        let locale = site.locale(self.subject.locale());
        let sitemap = site.users.build(&self.subject.subject(), &locale)?;

        let roots = match self.root.as_deref() {
            Some(uri) => {
                let node = sitemap.node_for(uri).ok_or_else(|| {
                    CliError::Validation(format!("{uri}: not visible to this subject"))
                })?;
                vec![node]
            }
            None => sitemap.roots(),
        };

        if self.json {
            let mut items = sitemap.navigation()?;
            if self.root.is_some() {
                let paths: Vec<String> = roots.iter().map(|&n| sitemap.uri(n)).collect();
                items = find_items(items, &paths);
            }
            output.result(&serde_json::to_string_pretty(&items)?)?;
            return Ok(());
        }

        output.info(&format!(
            "{} nodes visible in locale {locale}, sorted by {}",
            sitemap.len(),
            sitemap.order().kind
        ));
        for root in roots {
            print_node(&output, &sitemap, root, 0)?;
        }
        Ok(())
    }
}

fn print_node(
    output: &Output,
    sitemap: &UserSitemap,
    node: &UserNode,
    depth: usize,
) -> std::io::Result<()> {
    let indent = "  ".repeat(depth);
    let view = node.view().map(ViewRef::as_str).unwrap_or("-");
    let line = format!("{indent}{}  /{}  [{view}]", node.label(), sitemap.uri(node));
    if depth == 0 {
        output.highlight(&line)?;
    } else {
        output.result(&line)?;
    }

    for child in sitemap.children(node.id()) {
        print_node(output, sitemap, child, depth + 1)?;
    }
    Ok(())
}

/// Items (at any depth) whose path is one of `paths`.
fn find_items(items: Vec<NavItem>, paths: &[String]) -> Vec<NavItem> {
    let mut found = Vec::new();
    for item in items {
        if paths.contains(&item.path) {
            found.push(item);
        } else {
            found.extend(find_items(item.children, paths));
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn item(path: &str, children: Vec<NavItem>) -> NavItem {
        NavItem {
            title: path.to_owned(),
            path: path.to_owned(),
            view: None,
            children,
        }
    }

    #[test]
    fn test_find_items_descends() {
        let items = vec![
            item("a", vec![item("a/b", vec![item("a/b/c", Vec::new())])]),
            item("d", Vec::new()),
        ];

        let found = find_items(items, &["a/b".to_owned()]);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "a/b");
        assert_eq!(found[0].children[0].path, "a/b/c");
    }

    #[test]
    fn test_find_items_none() {
        let found = find_items(vec![item("a", Vec::new())], &["x".to_owned()]);

        assert!(found.is_empty());
    }
}
