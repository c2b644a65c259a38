mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, check, init, tree, ApplyArgs, CheckArgs, InitArgs, TreeArgs};

/// Trellis CLI - inspect and script visual site projects
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a config file and an empty project snapshot
    Init(InitArgs),

    /// Print the component tree of a project
    Tree(TreeArgs),

    /// Replay a mutation script against a project
    Apply(ApplyArgs),

    /// Verify a project snapshot
    Check(CheckArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Init(args) => init(args, &cwd),
            Command::Tree(args) => tree(args, &cwd),
            Command::Apply(args) => apply(args, &cwd),
            Command::Check(args) => check(args),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
