//! Helm values-file merging wrapper
//!
//! Intercepts `-f`/`--values` flags, deep-merges the referenced files in
//! command-line order, evaluates spruce-style `(( ... ))` expressions, and
//! runs the wrapped helm binary with a single synthesized values file.

pub mod args;
pub mod cli;
pub mod config;
pub mod error;
pub mod eval;
pub mod exec;
pub mod pipeline;
pub mod values;

pub use error::{Error, Report, Result};
