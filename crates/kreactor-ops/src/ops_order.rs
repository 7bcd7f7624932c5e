//! Operation: print the reactor build order.

use crate::{OutputFormat, Session};

/// Print modules so that every module follows the modules it depends on.
pub fn order(session: &Session, format: OutputFormat) -> miette::Result<()> {
    let graph = session.graph()?;
    let order = graph.build_order()?;
    match format {
        OutputFormat::Json => println!("{}", crate::to_json(&order)?),
        OutputFormat::Text => {
            for (i, id) in order.iter().enumerate() {
                let name = session
                    .reactor
                    .find(id)
                    .map(|m| m.display_name())
                    .unwrap_or(id.as_str());
                println!("{:>3}. {name} ({id})", i + 1);
            }
        }
    }
    Ok(())
}
