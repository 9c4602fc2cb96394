//! Environment checks run before the exporter process is started.
//!
//! Both checks report environment errors per condition so the caller gets
//! an actionable message instead of a process spawn failure.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::domain::SessionError;

/// Name of the exporter binary that converts a perf data file into the
/// event stream this crate decodes.
pub const EXPORTER_BINARY: &str = "perfparser";

/// Check that the recorded input exists, is a file, and is readable.
pub fn check_input_file(path: &Path) -> Result<(), SessionError> {
    if !path.exists() {
        return Err(SessionError::InputMissing(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(SessionError::InputNotAFile(path.to_path_buf()));
    }
    if File::open(path).is_err() {
        return Err(SessionError::InputNotReadable(path.to_path_buf()));
    }
    Ok(())
}

/// Locate the exporter binary: next to our own executable first (that is
/// where an installed tree puts it), then `../libexec`, then `$PATH`.
pub fn find_exporter_binary() -> Result<PathBuf, SessionError> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            for candidate in [dir.join(EXPORTER_BINARY), dir.join("../libexec").join(EXPORTER_BINARY)]
            {
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }
    }

    if let Some(paths) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&paths) {
            let candidate = dir.join(EXPORTER_BINARY);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(SessionError::ExporterNotFound(EXPORTER_BINARY.to_string()))
}
