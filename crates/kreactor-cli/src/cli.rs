//! CLI argument definitions for kreactor.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "kreactor",
    version,
    about = "Resolve the dependencies of a multi-module Maven reactor",
    long_about = "kreactor reads a reactor from its root pom.xml, resolves every module's \
                  dependencies against the local repository, and reports them per module, \
                  with shared dependencies, the module tree and the build order."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory or root pom.xml (defaults to the current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Config file (defaults to ~/.kreactor/config.toml)
    #[arg(long, global = true, env = "KREACTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Local repository directory
    #[arg(long, global = true)]
    pub local_repo: Option<PathBuf>,

    /// Keep going when a module's dependencies cannot be resolved
    #[arg(long, global = true)]
    pub degrade: bool,

    /// Do not expand remote dependencies from the local repository
    #[arg(long, global = true)]
    pub reactor_only: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List resolved dependencies of every module
    #[command(alias = "ls")]
    List {
        /// Only list one module (FullId or artifactId)
        #[arg(short, long)]
        module: Option<String>,
        /// Factor out dependencies shared by every module
        #[arg(long)]
        common: bool,
        /// Show local repository paths
        #[arg(long)]
        paths: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Show dependencies shared by every module
    Common {
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Display the reactor module tree
    Tree {
        /// Start from one module (FullId or artifactId)
        #[arg(short, long)]
        module: Option<String>,
        /// Maximum depth
        #[arg(short, long)]
        depth: Option<usize>,
        /// Show dependents instead of dependencies
        #[arg(short, long)]
        inverted: bool,
        /// Show version conflicts found during resolution
        #[arg(long)]
        conflicts: bool,
    },

    /// Print the module build order
    Order {
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// Parse command-line arguments.
pub fn parse() -> Cli {
    Cli::parse()
}
