//! Operation: show dependencies shared by every module.

use serde::Serialize;

use kreactor_resolver::common::{factor_common, CommonDependencies};
use kreactor_resolver::summary::list_line;

use crate::{OutputFormat, Session};

#[derive(Debug, Serialize)]
struct CommonReport {
    common: Vec<String>,
    modules: Vec<ModuleRemainder>,
}

#[derive(Debug, Serialize)]
struct ModuleRemainder {
    module: String,
    remote: Vec<String>,
}

/// Resolve the reactor, factor out the shared set and print it.
///
/// Factoring happens here whether or not `factor-common` is configured.
pub fn common(session: &Session, format: OutputFormat) -> miette::Result<()> {
    let resolution = session.resolve()?;
    let factored = factor_common(&resolution.modules);
    print!("{}", render(&factored, format)?);
    Ok(())
}

pub fn render(factored: &CommonDependencies, format: OutputFormat) -> miette::Result<String> {
    let report = CommonReport {
        common: factored.common.iter().map(list_line).collect(),
        modules: factored
            .modules
            .iter()
            .map(|m| ModuleRemainder {
                module: m.module.id(),
                remote: m.dependencies.remote.iter().map(list_line).collect(),
            })
            .collect(),
    };

    if format == OutputFormat::Json {
        return Ok(format!("{}\n", crate::to_json(&report)?));
    }

    let mut out = String::new();
    if report.common.is_empty() {
        out.push_str("No dependencies are shared by every module.\n");
    } else {
        out.push_str(&format!(
            "Shared by all {} modules ({}):\n",
            report.modules.len(),
            report.common.len()
        ));
        for line in &report.common {
            out.push_str(&format!("   {line}\n"));
        }
    }
    for module in &report.modules {
        if module.remote.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{} also uses:\n", module.module));
        for line in &module.remote {
            out.push_str(&format!("   {line}\n"));
        }
    }
    Ok(out)
}
