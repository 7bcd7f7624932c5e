//! Shared utilities for kreactor.
//!
//! This crate provides the cross-cutting concerns used by every other kreactor
//! crate: the unified error type and a handful of filesystem helpers.

pub mod errors;
pub mod fs;
