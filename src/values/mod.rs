//! Values file loading and deep merging

pub mod loader;
pub mod merge;

pub use loader::{load_values_file, merge_values_files};
pub use merge::deep_merge;
