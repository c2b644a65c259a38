use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use trellis_editor::{DiagnosticLevel, Editor, EditorConfig, Mutation, ProjectSnapshot};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Project snapshot file
    pub project: PathBuf,

    /// JSON array of mutations
    pub script: PathBuf,

    /// Where to write the result (defaults to overwriting the project)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Undo this many steps after the script ran
    #[arg(long, default_value_t = 0)]
    pub undo: usize,

    /// Report only, write nothing
    #[arg(long)]
    pub dry_run: bool,
}

/// Outcome of replaying a script
#[derive(Debug, Default, PartialEq)]
pub struct ApplySummary {
    pub applied: usize,
    pub rejected: usize,
    pub undone: usize,
}

pub fn apply(args: ApplyArgs, cwd: &Path) -> Result<()> {
    let config = EditorConfig::load(cwd).context("failed to load config")?;
    let snapshot = ProjectSnapshot::from_file(&args.project)
        .with_context(|| format!("failed to open {}", args.project.display()))?;
    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read {}", args.script.display()))?;
    let mutations: Vec<Mutation> =
        serde_json::from_str(&script).with_context(|| format!("invalid script {}", args.script.display()))?;

    println!("🔧 {} {} mutation(s)", "Applying".green().bold(), mutations.len());

    let mut editor = Editor::from_snapshot(snapshot, &config);
    let summary = replay(&mut editor, &mutations, args.undo);

    println!();
    println!("   Applied:  {}", summary.applied);
    if summary.rejected > 0 {
        println!("   {} {}", "Rejected:".yellow(), summary.rejected);
    }
    if summary.undone > 0 {
        println!("   Undone:   {}", summary.undone);
    }

    if args.dry_run {
        println!();
        println!("{}", "Dry run, nothing written".dimmed());
        return Ok(());
    }

    let out = args.out.unwrap_or(args.project);
    fs::write(&out, editor.snapshot().to_json()?)?;
    println!();
    println!("✨ {} {}", "Wrote".green().bold(), out.display());

    Ok(())
}

/// Apply each mutation in order, then undo `undo` steps
pub fn replay(editor: &mut Editor, mutations: &[Mutation], undo: usize) -> ApplySummary {
    let mut summary = ApplySummary::default();

    for (index, mutation) in mutations.iter().enumerate() {
        tracing::debug!(index, mutation = mutation.name(), "replaying");
        if editor.apply(mutation.clone()) {
            summary.applied += 1;
            println!("  {} {:>3} {}", "✓".green(), index, mutation.describe());
            continue;
        }

        summary.rejected += 1;
        for diagnostic in editor.take_diagnostics() {
            let level = match diagnostic.level {
                DiagnosticLevel::Error => "error".red(),
                DiagnosticLevel::Warning => "warning".yellow(),
                DiagnosticLevel::Info => "info".blue(),
            };
            println!(
                "  {} {:>3} {} [{}] {}",
                "✗".red(),
                index,
                level,
                diagnostic.code,
                diagnostic.message
            );
        }
    }

    while summary.undone < undo && editor.undo() {
        summary.undone += 1;
    }
    tracing::debug!(?summary, "replay finished");

    summary
}
