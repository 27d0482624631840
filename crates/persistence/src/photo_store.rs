// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Filesystem storage for Z-report photos.
//!
//! Keys have the form `{user_id}/{unix_millis}.{ext}` and are stored on the
//! report row. The key is resolved below the store root; keys that could
//! escape the root are rejected. Writes go through a temporary file so a
//! failed upload never leaves a partial photo.
//!
//! Calls block on file I/O; the server runs them on the blocking pool.

use mutlukent_domain::PhotoFormat;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::error::PersistenceError;

/// A directory of uploaded report photos.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    root: PathBuf,
}

impl PhotoStore {
    /// Creates a store rooted at `root`. The directory is created on first
    /// write.
    #[must_use]
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let relative: &Path = Path::new(key);
        let well_formed: bool = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !well_formed {
            return Err(PersistenceError::PhotoStorage(format!(
                "Invalid photo key: {key}"
            )));
        }
        Ok(self.root.join(relative))
    }

    /// Writes a photo and returns its key.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The uploading user
    /// * `format` - The validated image format
    /// * `bytes` - The image content
    ///
    /// # Errors
    ///
    /// Returns `PhotoStorage` if the directory or file cannot be written.
    pub fn save(
        &self,
        user_id: i64,
        format: PhotoFormat,
        bytes: &[u8],
    ) -> Result<String, PersistenceError> {
        let user_dir: PathBuf = self.root.join(user_id.to_string());
        std::fs::create_dir_all(&user_dir)?;

        let mut millis: i128 = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let (key, path): (String, PathBuf) = loop {
            let key: String = format!("{user_id}/{millis}.{}", format.extension());
            let path: PathBuf = self.resolve(&key)?;
            if !path.exists() {
                break (key, path);
            }
            millis += 1;
        };

        write_atomically(&path, bytes)?;
        info!(user_id, key = %key, size = bytes.len(), "Stored report photo");
        Ok(key)
    }

    /// Reads a photo back, with the format implied by its key.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no file exists for the key, or `PhotoStorage`
    /// if the key is malformed or the file cannot be read.
    pub fn load(&self, key: &str) -> Result<(Vec<u8>, PhotoFormat), PersistenceError> {
        let path: PathBuf = self.resolve(key)?;
        let format: PhotoFormat = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(PhotoFormat::from_extension)
            .ok_or_else(|| PersistenceError::PhotoStorage(format!("Unknown photo type: {key}")))?;

        match std::fs::read(&path) {
            Ok(bytes) => {
                debug!(key, size = bytes.len(), "Loaded report photo");
                Ok((bytes, format))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PersistenceError::NotFound(format!("Photo {key} not found")))
            }
            Err(e) => Err(PersistenceError::from(e)),
        }
    }

    /// Deletes a photo. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `PhotoStorage` if the key is malformed or the file exists but
    /// cannot be removed.
    pub fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let path: PathBuf = self.resolve(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!(key, "Removed report photo");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(key, "Photo already absent");
                Ok(())
            }
            Err(e) => Err(PersistenceError::from(e)),
        }
    }
}

/// Writes `bytes` to a `.tmp` sibling and renames it onto `path`.
///
/// A reader never sees a partial photo. On failure the temporary file is
/// removed and `path` is left untouched.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let mut tmp_name: OsString = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path: PathBuf = PathBuf::from(tmp_name);

    let written: std::io::Result<()> =
        std::fs::write(&tmp_path, bytes).and_then(|()| std::fs::rename(&tmp_path, path));
    if let Err(e) = written {
        warn!(path = %path.display(), error = %e, "Photo write failed");
        if let Err(cleanup) = std::fs::remove_file(&tmp_path)
            && cleanup.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %tmp_path.display(), error = %cleanup, "Temporary photo left behind");
        }
        return Err(PersistenceError::from(e));
    }
    Ok(())
}
