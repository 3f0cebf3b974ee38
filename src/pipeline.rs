//! The values pipeline
//!
//! Scanning → Merging → Evaluating → Serializing → WritingFile → Delegate,
//! or straight from Scanning to Delegate when no values file was given.
//! Every stage either hands its full output to the next one or stops the run.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::args::rewrite;
use crate::config::Config;
use crate::error::{Error, Report, Result};
use crate::eval::{Evaluator, OperatorEvaluator, Passthrough};
use crate::exec::{self, Workspace};
use crate::values::merge_values_files;

/// What the delegate gets: the rewritten args and, when values files were
/// given, the synthesized file they point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub args: Vec<OsString>,
    pub values_file: Option<PathBuf>,
}

/// Rewrite `args` and, if they reference values files, merge, evaluate and
/// write the result to `values_path`.
///
/// Nothing is written unless every earlier stage succeeded.
pub fn prepare(
    args: &[OsString],
    values_path: &Path,
    evaluator: &dyn Evaluator,
) -> Result<Prepared> {
    let rewrite = rewrite(args, values_path);

    if rewrite.sources.is_empty() {
        tracing::debug!("no values files given, passing arguments through");
        return Ok(Prepared { args: rewrite.args, values_file: None });
    }

    tracing::debug!("merging {} values file(s)", rewrite.sources.len());
    let merged = merge_values_files(rewrite.source_paths())?;

    tracing::debug!("evaluating merged values");
    let evaluated = evaluator.evaluate(merged)?;

    let data = serde_yaml::to_string(&evaluated).map_err(Error::Serialize)?;

    fs::write(values_path, data)
        .map_err(|source| Error::Write { path: values_path.to_path_buf(), source })?;
    tracing::debug!("wrote merged values to {}", values_path.display());

    Ok(Prepared { args: rewrite.args, values_file: Some(values_path.to_path_buf()) })
}

pub fn evaluator_for(config: &Config) -> Box<dyn Evaluator> {
    if config.skip_eval {
        Box::new(Passthrough)
    } else {
        Box::new(OperatorEvaluator)
    }
}

/// Full wrapper run for the process arguments `argv` (including argv[0]).
///
/// The temp directory is removed on every path once it exists; a failure
/// to remove it is reported next to whatever else went wrong.
pub fn run(argv: Vec<OsString>, config: &Config) -> Report<()> {
    let mut argv = argv.into_iter();
    let argv0 = argv.next().unwrap_or_default();
    let args: Vec<OsString> = argv.collect();

    let binary = match exec::resolve_binary(config.binary.as_deref(), &argv0) {
        Ok(binary) => binary,
        Err(err) => return Report::failed(err),
    };
    tracing::debug!("wrapping {}", binary.display());

    let prefix = Path::new(&argv0)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    let workspace = match Workspace::create(&prefix, &config.values_file) {
        Ok(workspace) => workspace,
        Err(err) => return Report::failed(err),
    };

    let evaluator = evaluator_for(config);
    let outcome = prepare(&args, workspace.values_path(), evaluator.as_ref())
        .and_then(|prepared| exec::invoke(&binary, &prepared.args));

    let mut report = Report::from(outcome);
    if let Err(err) = workspace.close() {
        report.push(err);
    }
    report
}
