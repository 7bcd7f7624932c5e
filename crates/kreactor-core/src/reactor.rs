use std::path::PathBuf;

use crate::module::Module;

/// A multi-module project: a root directory and its modules in load order.
#[derive(Debug, Clone)]
pub struct Reactor {
    pub root_dir: PathBuf,
    pub modules: Vec<Module>,
}

impl Reactor {
    /// Returns `true` if the reactor holds more than one module.
    pub fn is_multi_module(&self) -> bool {
        self.modules.len() > 1
    }

    /// Look up a module by the FullId of its coordinate.
    pub fn find(&self, full_id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id() == full_id)
    }

    /// Look up a module by artifactId alone.
    pub fn find_by_artifact_id(&self, artifact_id: &str) -> Option<&Module> {
        self.modules
            .iter()
            .find(|m| m.coordinate.artifact_id == artifact_id)
    }

    /// The module whose descriptor sits in the root directory, if any.
    pub fn root_module(&self) -> Option<&Module> {
        self.modules
            .iter()
            .find(|m| m.base_dir.as_deref() == Some(self.root_dir.as_path()))
    }
}
