//! Handler for `kreactor tree`.

use miette::Result;

use kreactor_ops::ops_tree::{self, TreeOptions};
use kreactor_ops::Session;

pub fn exec(
    session: &Session,
    module: Option<String>,
    depth: Option<usize>,
    inverted: bool,
    conflicts: bool,
) -> Result<()> {
    let opts = TreeOptions {
        depth,
        module,
        inverted,
        conflicts,
    };
    ops_tree::tree(session, &opts)
}
