//! Destination swap.
//!
//! A photo frame or dashboard reads the destination file at arbitrary times,
//! so it must never see a half-written image. The prepared image is written
//! to a temporary file in the destination's directory (same filesystem),
//! then persisted over the destination in one rename.
//!
//! ```text
//! frame/
//! ├── photo.jpg                # what readers see
//! └── .tmp-photo-Xa81Qz.jpg    # being written; renamed over photo.jpg on commit
//! ```
//!
//! A [`Staged`] file that is dropped without [`Staged::commit`] is deleted,
//! which is also how dry runs leave the destination untouched.
//!
//! Temporary files are created owner-only. Before the rename the staged file
//! takes the destination's current permissions, or `0644` for a new file, so
//! readers running as another user keep access.

use std::fs::{self, File, Permissions};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Cannot stage temporary file next to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Whether a prepared image replaces the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    Replace,
    /// Prepare the image but leave the destination alone.
    DryRun,
}

impl PublishMode {
    /// Debug level 2 and above is a dry run.
    pub fn from_debug_level(level: u8) -> Self {
        if level >= 2 { Self::DryRun } else { Self::Replace }
    }
}

/// A temporary file waiting to replace `destination`.
#[derive(Debug)]
pub struct Staged {
    tmp: NamedTempFile,
    destination: PathBuf,
}

/// Create a temporary file beside `destination`, carrying the same
/// extension so encoders can pick the format from it.
pub fn stage(destination: &Path) -> Result<Staged, PublishError> {
    let dir = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let suffix = destination
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let tmp = tempfile::Builder::new()
        .prefix(".tmp-photo-")
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|source| PublishError::Io {
            path: destination.to_path_buf(),
            source,
        })?;

    Ok(Staged {
        tmp,
        destination: destination.to_path_buf(),
    })
}

impl Staged {
    /// Where the prepared image should be written.
    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    /// Atomically move the staged file over the destination.
    pub fn commit(self) -> Result<PathBuf, PublishError> {
        let Staged { tmp, destination } = self;
        let persist_err = |source| PublishError::Persist {
            path: destination.clone(),
            source,
        };
        inherit_permissions(tmp.as_file(), &destination).map_err(persist_err)?;
        tmp.persist(&destination).map_err(|e| persist_err(e.error))?;
        Ok(destination)
    }

    /// Finish according to `mode`. Returns the destination when replaced.
    pub fn finish(self, mode: PublishMode) -> Result<Option<PathBuf>, PublishError> {
        match mode {
            PublishMode::Replace => self.commit().map(Some),
            PublishMode::DryRun => Ok(None),
        }
    }
}

/// Give `file` the permissions of `destination`, or the default for a new
/// file when `destination` does not exist yet.
pub(crate) fn inherit_permissions(file: &File, destination: &Path) -> io::Result<()> {
    let permissions = match fs::metadata(destination) {
        Ok(meta) => meta.permissions(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => new_file_permissions(file)?,
        Err(e) => return Err(e),
    };
    file.set_permissions(permissions)
}

#[cfg(unix)]
fn new_file_permissions(_file: &File) -> io::Result<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions(file: &File) -> io::Result<Permissions> {
    Ok(file.metadata()?.permissions())
}
