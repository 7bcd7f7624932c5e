//! Handler for `kreactor list`.

use miette::Result;

use kreactor_ops::ops_list::{self, ListOptions};
use kreactor_ops::{OutputFormat, Session};

pub fn exec(
    session: &Session,
    module: Option<String>,
    paths: bool,
    format: OutputFormat,
) -> Result<()> {
    let opts = ListOptions {
        format,
        paths,
        module,
    };
    ops_list::list(session, &opts)
}
