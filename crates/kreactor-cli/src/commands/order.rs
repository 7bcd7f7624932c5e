//! Handler for `kreactor order`.

use miette::Result;

use kreactor_ops::{ops_order, OutputFormat, Session};

pub fn exec(session: &Session, format: OutputFormat) -> Result<()> {
    ops_order::order(session, format)
}
