//! Command dispatch and handler modules.

mod common;
mod list;
mod order;
mod tree;

use std::path::Path;

use miette::Result;

use kreactor_ops::{OutputFormat, Overrides, Session};

use crate::cli::{Cli, Command, Format};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let mut overrides = Overrides {
        config_path: cli.config,
        degrade: cli.degrade,
        common: false,
        local_repo: cli.local_repo,
        reactor_only: cli.reactor_only,
    };
    if let Command::List { common: true, .. } = cli.command {
        overrides.common = true;
    }
    let project = match cli.project {
        Some(path) => path,
        None => std::env::current_dir().map_err(kreactor_util::errors::KreactorError::Io)?,
    };
    let session = open(&project, &overrides)?;

    match cli.command {
        Command::List {
            module,
            paths,
            format,
            ..
        } => list::exec(&session, module, paths, format.into()),
        Command::Common { format } => common::exec(&session, format.into()),
        Command::Tree {
            module,
            depth,
            inverted,
            conflicts,
        } => tree::exec(&session, module, depth, inverted, conflicts),
        Command::Order { format } => order::exec(&session, format.into()),
    }
}

fn open(project: &Path, overrides: &Overrides) -> Result<Session> {
    tracing::debug!(project = %project.display(), ?overrides, "opening session");
    Session::open(project, overrides)
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}
