//! File-backed snapshot storage.
//!
//! Persists snapshots as json files in a single directory:
//! - `<base_dir>/<name>.json`, one file per snapshot
//! - writes go to `<name>.json.tmp.<pid>` and are renamed into place
//! - files are 0600 and the directory 0700 on Unix (snapshots carry secrets)
//!
//! Supports:
//! - Saving (overwrite by name)
//! - Loading by name
//! - Listing names in sorted order
//! - Close-match name resolution

pub mod resolve;

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::snapshot::Snapshot;

const EXTENSION: &str = "json";
const MAX_NAME_LEN: usize = 128;

#[derive(Debug, Clone)]
pub struct Store {
    base_dir: PathBuf,
}

impl Store {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Store { base_dir: base_dir.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the file backing `name`. Fails for names that could escape the store.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.base_dir.join(format!("{name}.{EXTENSION}")))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Write `snapshot` under `name`, replacing any previous snapshot of that name.
    pub fn save(&self, name: &str, snapshot: &Snapshot) -> Result<PathBuf> {
        let final_path = self.path_for(name)?;
        self.ensure_base_dir()?;

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| Error::storage(&final_path, io::Error::other(e)))?;

        let temp_path = self
            .base_dir
            .join(format!("{name}.{EXTENSION}.tmp.{}", std::process::id()));

        if let Err(e) = write_file(&temp_path, json.as_bytes()) {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::storage(&temp_path, e));
        }

        if let Err(e) = fs::rename(&temp_path, &final_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::storage(&final_path, e));
        }

        tracing::info!(name, path = %final_path.display(), "snapshot written");
        Ok(final_path)
    }

    pub fn load(&self, name: &str) -> Result<Snapshot> {
        let path = self.path_for(name)?;
        tracing::debug!(name, path = %path.display(), "loading snapshot");

        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::NotFound { name: name.to_string() });
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                // not utf-8, so certainly not one of ours
                return Err(Error::CorruptData {
                    name: name.to_string(),
                    source: serde_json::Error::io(e),
                });
            }
            Err(e) => return Err(Error::storage(&path, e)),
        };

        serde_json::from_str(&contents).map_err(|source| Error::CorruptData {
            name: name.to_string(),
            source,
        })
    }

    /// Names of all stored snapshots, sorted. A missing directory is an empty store.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.base_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();

        for entry in WalkDir::new(&self.base_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                // a dangling symlink or unreadable entry is not a snapshot
                Err(e) if e.depth() >= 1 => {
                    tracing::debug!(path = ?e.path(), error = %e, "skipping unreadable entry");
                    continue;
                }
                Err(e) => return Err(Error::storage(&self.base_dir, e.into())),
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            if validate_name(stem).is_ok() {
                names.push(stem.to_string());
            } else {
                tracing::debug!(path = %path.display(), "skipping file with unusable name");
            }
        }

        Ok(names)
    }

    fn ensure_base_dir(&self) -> Result<()> {
        if self.base_dir.is_dir() {
            return Ok(());
        }

        fs::create_dir_all(&self.base_dir).map_err(|e| Error::storage(&self.base_dir, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.base_dir, fs::Permissions::from_mode(0o700))
                .map_err(|e| Error::storage(&self.base_dir, e))?;
        }

        tracing::debug!(path = %self.base_dir.display(), "created snapshot directory");
        Ok(())
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;

    // mode() only applies on creation, a leftover temp file keeps its own
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(bytes)?;
    file.write_all(b"\n")?;
    file.sync_all()
}

/// Names double as file names, so they are kept to a conservative alphabet.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.len() > MAX_NAME_LEN {
        Some("name is longer than 128 bytes")
    } else if name.starts_with('.') {
        Some("name may not start with '.'")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | '@'))
    {
        Some("only letters, digits and - _ . + @ are allowed")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidName { name: name.to_string(), reason }),
        None => Ok(()),
    }
}
