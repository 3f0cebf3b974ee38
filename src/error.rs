//! Error kinds and the multi-error report
//!
//! Every stage fails fast with a single [`Error`]. Cleanup runs after a
//! failure anyway, so a run can end with more than one error; [`Report`]
//! keeps all of them.

use std::path::PathBuf;
use std::process::ExitStatus;

use crate::eval::EvalError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("failed to find Helm binary '{name}'")]
    BinaryNotFound { name: String },

    #[error("failed to create temporary directory: {source}")]
    TempDirCreate {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove temporary directory '{}': {source}", path.display())]
    TempDirRemove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open values file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse values file '{}' as yaml: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to eval merged helm values: {0}")]
    Evaluation(#[from] EvalError),

    #[error("failed to marshal merged and evaluated helm values to yaml: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error(
        "failed to write merged and evaluated helm values to destination file '{}': {source}",
        path.display()
    )]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run Helm '{}': {source}", binary.display())]
    DelegateSpawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Helm '{}' exited unsuccessfully: {status}", binary.display())]
    DelegateStatus { binary: PathBuf, status: ExitStatus },
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl Error {
    /// Process exit code this error maps to.
    ///
    /// A wrapped binary that exited on its own keeps its code; everything
    /// else is 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::DelegateStatus { status, .. } => status
                .code()
                .and_then(|code| u8::try_from(code).ok())
                .filter(|code| *code != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }
}

/// Outcome of a run: an optional value plus every error collected on the way.
#[derive(Debug)]
#[must_use]
pub struct Report<T> {
    value: Option<T>,
    errors: Vec<Error>,
}

impl<T> Report<T> {
    pub fn ok(value: T) -> Self {
        Self { value: Some(value), errors: Vec::new() }
    }

    pub fn failed(error: Error) -> Self {
        Self { value: None, errors: vec![error] }
    }

    /// Record an additional, independent failure.
    pub fn push(&mut self, error: Error) {
        self.errors.push(error);
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// 0 when nothing failed, otherwise the code of the first error.
    pub fn exit_code(&self) -> u8 {
        self.errors.first().map_or(0, Error::exit_code)
    }

    pub fn into_parts(self) -> (Option<T>, Vec<Error>) {
        (self.value, self.errors)
    }
}

impl<T> From<Result<T>> for Report<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Report::ok(value),
            Err(err) => Report::failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_error(path: &str) -> Error {
        Error::Read {
            path: PathBuf::from(path),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        }
    }

    #[test]
    fn test_report_from_ok_result() {
        let report: Report<u32> = Ok(7).into();
        assert!(report.is_ok());
        assert_eq!(report.value(), Some(&7));
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_report_keeps_every_error_in_order() {
        let mut report: Report<()> = Report::failed(read_error("a.yaml"));
        report.push(Error::TempDirRemove {
            path: PathBuf::from("/tmp/helm.abc"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });

        let (value, errors) = report.into_parts();
        assert!(value.is_none());
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], Error::Read { .. }));
        assert!(matches!(errors[1], Error::TempDirRemove { .. }));
    }

    #[test]
    fn test_error_messages_name_the_file() {
        let msg = read_error("base.yaml").to_string();
        assert!(msg.contains("failed to open values file 'base.yaml'"), "{msg}");
    }

    #[test]
    fn test_exit_code_is_one_for_pipeline_errors() {
        let report: Report<()> = Report::failed(read_error("x.yaml"));
        assert_eq!(report.exit_code(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_propagates_delegate_status() {
        use std::os::unix::process::ExitStatusExt;

        let err = Error::DelegateStatus {
            binary: PathBuf::from("helm"),
            status: ExitStatus::from_raw(3 << 8),
        };
        assert_eq!(err.exit_code(), 3);

        // Killed by a signal: no code to propagate.
        let err = Error::DelegateStatus {
            binary: PathBuf::from("helm"),
            status: ExitStatus::from_raw(9),
        };
        assert_eq!(err.exit_code(), 1);
    }
}
