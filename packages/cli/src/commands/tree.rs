use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use trellis_editor::{Breakpoint, EditorConfig, EntityStore, Node, ProjectSnapshot};

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Project snapshot file
    pub project: PathBuf,

    /// Breakpoint whose effective props are shown (desktop, tablet, mobile)
    #[arg(short, long)]
    pub breakpoint: Option<Breakpoint>,

    /// Print the effective props of every node
    #[arg(short, long)]
    pub props: bool,

    /// Only print this page (id or name)
    #[arg(long)]
    pub page: Option<String>,
}

pub fn tree(args: TreeArgs, cwd: &Path) -> Result<()> {
    let config = EditorConfig::load(cwd).context("failed to load config")?;
    let snapshot = ProjectSnapshot::from_file(&args.project)
        .with_context(|| format!("failed to open {}", args.project.display()))?;
    let breakpoint = args.breakpoint.unwrap_or(config.default_breakpoint);

    println!(
        "🌳 {} {} @ {} ({}px)",
        "Project".green().bold(),
        snapshot.name.bright_white(),
        breakpoint.to_string().cyan(),
        breakpoint.viewport_width()
    );

    let store = &snapshot.store;
    let mut shown = 0;
    for page in store.pages() {
        if let Some(filter) = &args.page {
            if filter != page.id.as_str() && filter != &page.name {
                continue;
            }
        }
        shown += 1;

        println!();
        println!("{} {}", page.name.bold(), format!("[{}]", page.id).dimmed());
        let roots = store.roots(&page.id)?;
        if roots.is_empty() {
            println!("  {}", "(empty)".dimmed());
        }
        for root in roots {
            print_node(store, root, 1, breakpoint, args.props)?;
        }
    }

    if shown == 0 {
        if let Some(filter) = args.page {
            return Err(anyhow::anyhow!("No page named {}", filter));
        }
    }

    Ok(())
}

fn print_node(store: &EntityStore, node: &Node, depth: usize, breakpoint: Breakpoint, props: bool) -> Result<()> {
    let indent = "  ".repeat(depth);
    let marker = if store.selected() == Some(&node.id) {
        "▸".yellow().to_string()
    } else {
        "-".dimmed().to_string()
    };
    let overrides = if node.responsive_props.get(breakpoint).is_empty() {
        String::new()
    } else {
        format!(" *{}", breakpoint).magenta().to_string()
    };

    println!(
        "{}{} {} {}{}",
        indent,
        marker,
        node.component_type.bright_white(),
        format!("#{}", node.id).dimmed(),
        overrides
    );

    if props {
        for (key, value) in node.effective_props(breakpoint) {
            println!("{}    {}: {}", indent, key.cyan(), value);
        }
    }

    for child in store.children(&node.id)? {
        print_node(store, child, depth + 1, breakpoint, props)?;
    }
    Ok(())
}
