//! Handler for `kreactor common`.

use miette::Result;

use kreactor_ops::{ops_common, OutputFormat, Session};

pub fn exec(session: &Session, format: OutputFormat) -> Result<()> {
    if session.reactor.modules.len() < 2 {
        eprintln!("Only one module in the reactor, nothing to share.");
    }
    ops_common::common(session, format)
}
