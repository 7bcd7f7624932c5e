//! Factoring remote dependencies shared by every module.

use std::collections::BTreeSet;

use kreactor_core::artifact::Artifact;

use crate::ordering;
use crate::resolver::ModuleResolution;

/// Remote dependencies shared by all modules, and each module's remainder.
#[derive(Debug, Clone, Default)]
pub struct CommonDependencies {
    pub common: Vec<Artifact>,
    pub modules: Vec<ModuleResolution>,
}

/// Two artifacts are shared only if coordinate and scope both match.
fn commonality_key(artifact: &Artifact) -> String {
    format!("{}:{}", artifact.full_id(), artifact.effective_scope())
}

/// Move remote dependencies present in every module into a common set.
///
/// With fewer than two modules nothing is shared and the input is returned
/// unchanged.
pub fn factor_common(modules: &[ModuleResolution]) -> CommonDependencies {
    let Some((first, rest)) = modules.split_first() else {
        return CommonDependencies::default();
    };
    if rest.is_empty() {
        return CommonDependencies {
            common: Vec::new(),
            modules: modules.to_vec(),
        };
    }

    let mut shared: BTreeSet<String> = first
        .dependencies
        .remote
        .iter()
        .map(commonality_key)
        .collect();
    for other in rest {
        let keys: BTreeSet<String> = other
            .dependencies
            .remote
            .iter()
            .map(commonality_key)
            .collect();
        shared.retain(|k| keys.contains(k));
        if shared.is_empty() {
            break;
        }
    }

    let mut common: Vec<Artifact> = first
        .dependencies
        .remote
        .iter()
        .filter(|a| shared.contains(&commonality_key(a)))
        .cloned()
        .collect();
    ordering::sort(&mut common);

    let modules = modules
        .iter()
        .map(|m| {
            let mut m = m.clone();
            m.dependencies
                .remote
                .retain(|a| !shared.contains(&commonality_key(a)));
            m
        })
        .collect();

    tracing::debug!(common = common.len(), "factored common dependencies");
    CommonDependencies { common, modules }
}
