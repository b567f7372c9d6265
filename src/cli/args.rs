//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Sort Java annotations by a configurable priority order
#[derive(Parser, Debug)]
#[command(name = "annosort")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug output (repeat for more: -d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding `.annotation-sorting.json` (default: cwd)
    #[arg(short = 'C', long, global = true, env = "ANNOSORT_PROJECT_DIR", value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sort annotations in Java files and directories
    Sort {
        /// Files or directories (default: project directory)
        #[arg(value_hint = ValueHint::AnyPath)]
        paths: Vec<PathBuf>,

        /// Report units that would change without writing; exit 1 if any
        #[arg(long)]
        check: bool,
    },

    /// Show the declaration tree of a Java file with annotation ranks
    Inspect {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the global and effective order
    Show,
    /// Show config file locations
    Path,
    /// Print a commented template for the global config
    Template,
    /// Write the global order to the project directory
    Export,
}
