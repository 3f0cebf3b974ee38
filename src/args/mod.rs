//! Values-file flag detection and argument rewriting
//!
//! Helm accepts `-f`/`--values` any number of times. The rewriter pulls
//! every referenced file out of argv and leaves a single flag pointing at
//! the synthesized file.

pub mod matcher;
pub mod rewriter;

pub use matcher::{match_flag, FlagMatch};
pub use rewriter::{rewrite, Rewrite, ValueFileRef};
