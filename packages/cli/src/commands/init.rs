use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::fs;
use std::path::Path;
use trellis_editor::{Editor, EditorConfig, Props, DEFAULT_CONFIG_NAME};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Project name
    pub name: String,

    /// Add a starter hero section to the home page
    #[arg(long)]
    pub starter: bool,

    /// Force overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

pub fn snapshot_file_name(name: &str) -> String {
    format!("{}.trellis.json", name)
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);
    let project_path = cwd.join(snapshot_file_name(&args.name));

    if project_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            project_path.display().to_string().bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!(
        "{}",
        format!("📝 Initializing Trellis project {}...", args.name)
            .bright_blue()
            .bold()
    );

    if !config_path.exists() || args.force {
        let config_json = serde_json::to_string_pretty(&EditorConfig::default())?;
        fs::write(&config_path, config_json)?;
        println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    }

    let mut editor = Editor::new(&args.name);
    if args.starter {
        add_starter(&mut editor);
    }

    fs::write(&project_path, editor.snapshot().to_json()?)?;
    println!("  {} Created {}", "✓".green(), snapshot_file_name(&args.name));
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: trellis tree {}", snapshot_file_name(&args.name));
    println!("  2. Write a mutation script and run: trellis apply <project> <script>");

    Ok(())
}

fn add_starter(editor: &mut Editor) {
    let Some(page) = editor.current_page().cloned() else {
        return;
    };
    let Some(hero) = editor.add_node("Section", Props::new(), None, &page) else {
        return;
    };

    let heading = json!({ "text": "Welcome", "level": 1 });
    let button = json!({ "label": "Get started" });
    if let (Some(heading), Some(button)) = (heading.as_object(), button.as_object()) {
        editor.add_node("Heading", heading.clone(), Some(&hero), &page);
        editor.add_node("Button", button.clone(), Some(&hero), &page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_editor::ProjectSnapshot;

    #[test]
    fn test_init_writes_config_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            name: "landing".to_string(),
            starter: true,
            force: false,
        };

        init(args, dir.path()).unwrap();

        assert!(dir.path().join(DEFAULT_CONFIG_NAME).exists());
        let snapshot = ProjectSnapshot::from_file(dir.path().join("landing.trellis.json")).unwrap();
        assert_eq!(snapshot.name, "landing");
        assert_eq!(snapshot.store.len(), 3);
    }
}
