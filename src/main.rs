//! helm-spruce: merge Helm values files and evaluate them before running helm
//!
//! Install it as `helm` in front of the real binary (renamed `_helm`), or
//! call it directly. All `-f`/`--values` files are merged in order, evaluated,
//! and handed to helm as a single file.

use std::process::ExitCode;

fn main() -> ExitCode {
    helm_spruce::cli::run()
}
