//! Core data types for kreactor.
//!
//! This crate defines the values that flow through a reactor dependency
//! resolution run: artifact coordinates and scopes, dependency declarations
//! as written in a module descriptor, reactor modules, Maven version
//! specifications, user configuration, and the contract of the external
//! artifact resolution service.
//!
//! This crate is intentionally free of network I/O; only configuration
//! loading touches the filesystem.

pub mod artifact;
pub mod config;
pub mod declaration;
pub mod module;
pub mod reactor;
pub mod service;
pub mod version;
