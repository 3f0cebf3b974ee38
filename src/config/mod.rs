//! Wrapper configuration
//!
//! The wrapper owns no command-line flags, so everything it can be told
//! comes from `HELM_SPRUCE_*` environment variables layered over defaults.

pub mod loader;

pub use loader::{load_config, Config};
