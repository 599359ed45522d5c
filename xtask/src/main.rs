//! Build automation tasks for autobump.
//!
//! - `completions` - Generate shell completions
//! - `man` - Generate man pages
//!
//! Run `cargo xtask --help` to see available commands.

#![deny(unsafe_code)]

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "xtask")]
#[command(about = "Project maintenance tasks")]
struct Xtask {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand, Debug)]
enum Task {
    /// Generate shell completions for the autobump CLI.
    Completions(commands::completions::CompletionsArgs),

    /// Generate manpages for the autobump CLI and its subcommands.
    Man(commands::man::ManArgs),
}

fn main() -> Result<(), String> {
    match Xtask::parse().command {
        Task::Completions(args) => commands::completions::cmd_completions(args),
        Task::Man(args) => commands::man::cmd_man(args),
    }
}

/// Workspace root, one level above this crate.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.parent().unwrap_or(&manifest_dir).to_path_buf()
}

/// Create `dir` (relative to the workspace root) and return its full path.
pub fn output_dir(dir: PathBuf) -> Result<PathBuf, String> {
    let out_dir = workspace_root().join(dir);
    std::fs::create_dir_all(&out_dir).map_err(|e| format!("{}: {e}", out_dir.display()))?;
    Ok(out_dir)
}
