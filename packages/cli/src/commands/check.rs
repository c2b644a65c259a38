use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use trellis_editor::{Breakpoint, LoadError, ProjectSnapshot};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Project snapshot file
    pub project: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub name: String,
    pub version: u32,
    pub pages: usize,
    pub nodes: usize,
    pub containers: usize,
    /// Nodes with at least one override, per breakpoint
    pub overrides: Vec<(Breakpoint, usize)>,
}

impl CheckReport {
    pub fn from_snapshot(snapshot: &ProjectSnapshot) -> Self {
        let store = &snapshot.store;
        let overrides = Breakpoint::ALL
            .iter()
            .map(|bp| {
                let count = store
                    .nodes()
                    .filter(|n| !n.responsive_props.get(*bp).is_empty())
                    .count();
                (*bp, count)
            })
            .collect();

        Self {
            name: snapshot.name.clone(),
            version: snapshot.version,
            pages: store.pages().len(),
            nodes: store.len(),
            containers: store.nodes().filter(|n| n.allow_children).count(),
            overrides,
        }
    }
}

pub fn check(args: CheckArgs) -> Result<()> {
    let snapshot = match ProjectSnapshot::from_file(&args.project) {
        Ok(snapshot) => snapshot,
        Err(LoadError::Inconsistent(err)) => {
            println!("{} {} [{}] {}", "✗".red(), args.project.display(), err.code(), err);
            return Err(anyhow::anyhow!("Snapshot is inconsistent"));
        }
        Err(err) => return Err(err.into()),
    };

    let report = CheckReport::from_snapshot(&snapshot);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} {}", "✓".green(), args.project.display());
    println!("   Project:    {} (v{})", report.name.bright_white(), report.version);
    println!("   Pages:      {}", report.pages);
    println!("   Nodes:      {} ({} containers)", report.nodes, report.containers);
    for (breakpoint, count) in &report.overrides {
        if *count > 0 {
            println!("   {:<11} {} node(s) with overrides", format!("{}:", breakpoint), count);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trellis_editor::{Editor, Props};

    #[test]
    fn test_report_counts() {
        let mut editor = Editor::new("report");
        let page = editor.current_page().cloned().unwrap();
        let section = editor.add_node("Section", Props::new(), None, &page).unwrap();
        let heading = editor.add_node("Heading", Props::new(), Some(&section), &page).unwrap();
        editor.update_responsive_props(
            &heading,
            Breakpoint::Mobile,
            json!({ "level": 2 }).as_object().cloned().unwrap(),
        );

        let report = CheckReport::from_snapshot(&editor.snapshot());

        assert_eq!(report.pages, 1);
        assert_eq!(report.nodes, 2);
        assert_eq!(report.containers, 1);
        assert_eq!(
            report.overrides,
            vec![
                (Breakpoint::Desktop, 0),
                (Breakpoint::Tablet, 0),
                (Breakpoint::Mobile, 1)
            ]
        );
    }
}
