//! Everything outside the values pipeline: finding the wrapped binary, the
//! scoped temp directory, and running the delegate.

pub mod delegate;
pub mod locate;
pub mod workspace;

pub use delegate::invoke;
pub use locate::{resolve_binary, wrapped_binary_name};
pub use workspace::Workspace;
