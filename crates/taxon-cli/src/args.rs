use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "taxon")]
#[command(about = "Depth-bounded category manager for product catalogs")]
#[command(version)]
pub struct Cli {
    /// Base directory (default: ~/.taxon)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a category
    Add {
        /// Category name (unique across the whole catalog)
        name: String,

        /// Parent category id (omit to create a root)
        #[arg(short, long)]
        parent: Option<u64>,
    },

    /// Rename a category
    Rename {
        /// Category id
        id: u64,

        /// New name
        name: String,
    },

    /// List categories
    List {
        /// Only categories under this parent id
        #[arg(short, long, conflicts_with = "roots")]
        parent: Option<u64>,

        /// Only root categories
        #[arg(long)]
        roots: bool,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the three-level view for a selection
    Tree {
        /// Selected root category id
        #[arg(long)]
        root: Option<String>,

        /// Selected first-level category id
        #[arg(long)]
        first: Option<String>,

        /// Selected second-level category id
        #[arg(long)]
        second: Option<String>,

        /// Emit JSON instead of columns
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get { key: String },

    /// Set a config value
    Set { key: String, value: String },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Create config file with defaults
    Init,
}
