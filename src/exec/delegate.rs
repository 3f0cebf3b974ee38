//! Run the wrapped binary

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Run `binary` with `args`, inheriting environment and stdio, and wait for it.
pub fn invoke(binary: &Path, args: &[OsString]) -> Result<()> {
    tracing::debug!("running {} {:?}", binary.display(), args);

    let status = Command::new(binary)
        .args(args)
        .status()
        .map_err(|source| Error::DelegateSpawn { binary: binary.to_path_buf(), source })?;

    if !status.success() {
        return Err(Error::DelegateStatus { binary: binary.to_path_buf(), status });
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_success() {
        let args = [OsString::from("-c"), OsString::from("exit 0")];
        invoke(Path::new("/bin/sh"), &args).expect("run");
    }

    #[test]
    fn test_non_zero_exit_is_reported_with_code() {
        let args = [OsString::from("-c"), OsString::from("exit 4")];
        let err = invoke(Path::new("/bin/sh"), &args).unwrap_err();
        assert!(matches!(err, Error::DelegateStatus { .. }), "{err:?}");
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_spawn_failure() {
        let err = invoke(Path::new("/nonexistent/helm"), &[]).unwrap_err();
        assert!(matches!(err, Error::DelegateSpawn { .. }), "{err:?}");
        assert_eq!(err.exit_code(), 1);
    }
}
