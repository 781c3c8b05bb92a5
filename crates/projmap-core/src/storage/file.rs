//! File-based storage for native platforms.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::ProjectDocument;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Stores each project as `<id>.json` in one directory.
///
/// Writes go to a hidden sibling file first and are renamed into place, so
/// an interrupted save never leaves a truncated project behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

fn io_error<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> StorageError + 'a {
    move |e| StorageError::Io(format!("failed to {action} {}: {e}", path.display()))
}

/// Map an id onto a file stem: anything but alphanumerics, `-` and `_`
/// becomes `_`.
fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl FileStorage {
    /// Open storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&base_path).map_err(io_error("create", &base_path))?;
        Ok(Self { base_path })
    }

    /// Storage in the platform data directory, e.g.
    /// `~/.local/share/projmap/projects/` on Linux.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("no data or home directory".to_string()))?;
        Self::new(base.join("projmap").join("projects"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn project_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{}.{EXTENSION}", file_stem(id)))
    }

    fn staging_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!(".{}.{EXTENSION}.tmp", file_stem(id)))
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &ProjectDocument) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.project_path(id);
        let staging = self.staging_path(id);
        let json = document.to_json();
        Box::pin(async move {
            fs::write(&staging, json?).map_err(io_error("write", &staging))?;
            fs::rename(&staging, &path).map_err(io_error("replace", &path))?;
            log::debug!("saved project to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<ProjectDocument>> {
        let path = self.project_path(id);
        let id = id.to_string();
        Box::pin(async move {
            let json = match fs::read_to_string(&path) {
                Ok(json) => json,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(StorageError::NotFound(id));
                }
                Err(e) => return Err(io_error("read", &path)(e)),
            };
            ProjectDocument::from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("{}: {e}", path.display()))
            })
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.project_path(id);
        Box::pin(async move {
            match fs::remove_file(&path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(io_error("delete", &path)(e)),
                _ => Ok(()),
            }
        })
    }

    /// Ids in ascending order. Staging files and other extensions are skipped.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            let entries = match fs::read_dir(&base) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(io_error("list", &base)(e)),
            };
            let mut ids: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == EXTENSION))
                .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
                .filter(|stem| !stem.starts_with('.'))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.project_path(id);
        Box::pin(async move { Ok(path.is_file()) })
    }
}
