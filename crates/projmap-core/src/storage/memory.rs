//! In-memory storage.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::ProjectDocument;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Keeps each project as its serialized JSON text, keyed by id, the way a
/// browser host keeps projects in local storage.
///
/// Documents go through the same encode and decode path as on disk, so a
/// load never hands back state that could not have been persisted.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored text for `id`, exactly as saved.
    pub fn raw(&self, id: &str) -> Option<String> {
        self.entries.read().ok()?.get(id).cloned()
    }

    /// Store already-serialized project text under `id` without checking it.
    pub fn insert_raw(&self, id: &str, json: String) -> StorageResult<()> {
        self.entries.write().map_err(poisoned)?.insert(id.to_string(), json);
        Ok(())
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StorageError {
    StorageError::Other("memory storage lock poisoned".to_string())
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &ProjectDocument) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let json = document.to_json();
        Box::pin(async move {
            let json = json?;
            log::debug!("memory storage: saved {id} ({} bytes)", json.len());
            self.entries.write().map_err(poisoned)?.insert(id, json);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<ProjectDocument>> {
        let id = id.to_string();
        Box::pin(async move {
            let entries = self.entries.read().map_err(poisoned)?;
            let json = entries.get(&id).ok_or_else(|| StorageError::NotFound(id.clone()))?;
            Ok(ProjectDocument::from_json(json)?)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.entries.write().map_err(poisoned)?.remove(&id);
            Ok(())
        })
    }

    /// Ids in ascending order.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let entries = self.entries.read().map_err(poisoned)?;
            Ok(entries.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.entries.read().map_err(poisoned)?.contains_key(&id)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::Mask;
    use crate::storage::block_on;

    fn project() -> ProjectDocument {
        ProjectDocument::new(Vec::new(), vec![Mask::new(3)])
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let doc = project();
        block_on(storage.save("stage-left", &doc)).unwrap();
        assert_eq!(block_on(storage.load("stage-left")).unwrap(), doc);
    }

    #[test]
    fn test_stores_document_json() {
        let storage = MemoryStorage::new();
        let doc = project();
        block_on(storage.save("stage-left", &doc)).unwrap();
        assert_eq!(storage.raw("stage-left"), Some(doc.to_json().unwrap()));
        assert!(storage.raw("stage-right").is_none());
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_entry_is_serialization_error() {
        let storage = MemoryStorage::new();
        storage.insert_raw("broken", "{".to_string()).unwrap();
        storage.insert_raw("future", r#"{"version": "2.0"}"#.to_string()).unwrap();
        assert!(matches!(
            block_on(storage.load("broken")),
            Err(StorageError::Serialization(_))
        ));
        assert!(matches!(
            block_on(storage.load("future")),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();
        assert!(!block_on(storage.exists("test")).unwrap());
        block_on(storage.save("test", &project())).unwrap();
        assert!(block_on(storage.exists("test")).unwrap());
        block_on(storage.delete("test")).unwrap();
        assert!(!block_on(storage.exists("test")).unwrap());
        // Deleting again is fine.
        block_on(storage.delete("test")).unwrap();
    }

    #[test]
    fn test_list_is_sorted() {
        let storage = MemoryStorage::new();
        block_on(storage.save("doc2", &project())).unwrap();
        block_on(storage.save("doc1", &project())).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["doc1", "doc2"]);
    }
}
