use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all kreactor operations.
#[derive(Debug, Error, Diagnostic)]
pub enum KreactorError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A declared dependency carries a version that is neither a version nor a range.
    #[error("Invalid version '{spec}' for {artifact} in module {module}: {reason}")]
    #[diagnostic(help("Use a plain version like 1.2.3 or a range like [1.0,2.0)"))]
    InvalidVersionSpec {
        module: String,
        artifact: String,
        spec: String,
        reason: String,
    },

    /// A system-scoped dependency without a local file.
    #[error("System-scoped dependency {artifact} in module {module} has no systemPath")]
    MissingSystemPath { module: String, artifact: String },

    /// The artifact resolution service failed for a module.
    #[error("Dependency resolution failed for {module}: {message}")]
    #[diagnostic(help("Pass --degrade to keep unresolved dependencies and continue"))]
    Resolution { module: String, message: String },

    /// Two modules of the reactor share the same coordinate.
    #[error("Duplicate module coordinate in reactor: {coordinate}")]
    #[diagnostic(help("Every module must have a unique groupId:artifactId:version"))]
    DuplicateArtifactId { coordinate: String },

    /// Reactor modules depend on each other in a loop.
    #[error("Cyclic dependency between reactor modules: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    /// A module was referenced that is not part of the reactor.
    #[error("Module not found in reactor: {coordinate}")]
    ModuleNotFound { coordinate: String },

    /// Invalid or unreadable build descriptor (e.g. pom.xml).
    #[error("Descriptor error in {path}: {message}")]
    #[diagnostic(help("Check the pom.xml for syntax errors"))]
    Descriptor { path: String, message: String },

    /// Invalid user configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Result alias used by the library crates.
pub type KreactorResult<T> = Result<T, KreactorError>;
