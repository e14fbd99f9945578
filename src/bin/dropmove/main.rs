mod config;
mod logger;
mod mover;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::config::ConflictPolicy;
use crate::mover::DropMove;

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Move files into a destination folder, optionally organized by file name"
)]
struct Args {
    /// Files to move
    #[arg(value_hint = clap::ValueHint::FilePath)]
    paths: Vec<PathBuf>,

    /// Destination folder, overrides the saved destination
    #[arg(short, long, name = "DIR", value_hint = clap::ValueHint::DirPath)]
    dest: Option<PathBuf>,

    /// Organize files into subfolders based on the file name
    #[arg(short, long, conflicts_with = "no_organize")]
    organize: bool,

    /// Move files directly into the destination folder
    #[arg(short = 'O', long)]
    no_organize: bool,

    /// Leave out the client folder
    #[arg(long)]
    no_product: bool,

    /// Leave out the year folder
    #[arg(long)]
    no_year: bool,

    /// Leave out the month folder
    #[arg(long)]
    no_month: bool,

    /// Leave out the file type folder
    #[arg(long)]
    no_extension: bool,

    /// How to handle files that already exist in the destination
    #[arg(short = 'c', long, value_enum, name = "ACTION")]
    on_conflict: Option<ConflictPolicy>,

    /// Read file content from stdin and save it with the given name
    #[arg(long, name = "NAME")]
    stdin: Option<String>,

    /// Suffix used when renaming conflicting files
    #[arg(long, name = "SUFFIX")]
    suffix: Option<String>,

    /// Save destination and organization options as the new defaults
    #[arg(short, long)]
    save: bool,

    /// Only print target paths and conflicts without moving files
    #[arg(short, long)]
    print: bool,

    /// Write a log file of the moves
    #[arg(short = 'L', long)]
    log: bool,

    /// Print debug information
    #[arg(short = 'D', long)]
    debug: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        dropmove::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        DropMove::new(args)?.run().await
    }
}
