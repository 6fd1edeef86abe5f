//! Local mirror store backed by sled.
//!
//! Each collection is a sled tree and each document is stored under its
//! key field as JSON bytes. Inserting an existing key overwrites it, which
//! gives the same upsert semantics as the remote destinations without a
//! server.

use crate::error::SinkError;
use crate::sink::Sink;
use serde_json::Value;
use sled::Db;
use std::path::Path;

/// Fields a document may be keyed by: graph documents use `_key`, search
/// documents use `id`.
const KEY_FIELDS: [&str; 2] = ["_key", "id"];

pub struct StoreSink {
    db: Db,
}

impl StoreSink {
    /// Opens or creates a store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Number of documents stored in a collection.
    pub fn count(&self, collection: &str) -> Result<usize, SinkError> {
        Ok(self.db.open_tree(collection)?.len())
    }

    /// Loads one document by key.
    pub fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, SinkError> {
        match self.db.open_tree(collection)?.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Every key stored in a collection, in byte order.
    pub fn keys(&self, collection: &str) -> Result<Vec<String>, SinkError> {
        let tree = self.db.open_tree(collection)?;
        let mut keys = Vec::with_capacity(tree.len());
        for entry in tree.iter() {
            let (key, _) = entry?;
            keys.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(keys)
    }

    /// Removes every collection.
    pub fn clear(&self) -> Result<(), SinkError> {
        for name in self.db.tree_names() {
            // The default tree cannot be dropped; it is never written to.
            if &*name != b"__sled__default" {
                self.db.drop_tree(name)?;
            }
        }
        self.db.flush()?;
        Ok(())
    }
}

impl Sink for StoreSink {
    fn name(&self) -> &str {
        "store"
    }

    fn upsert(&mut self, collection: &str, documents: &[Value]) -> Result<usize, SinkError> {
        let tree = self.db.open_tree(collection)?;
        let mut batch = sled::Batch::default();
        for doc in documents {
            let key = document_key(doc).ok_or_else(|| SinkError::MissingKey {
                collection: collection.to_string(),
            })?;
            batch.insert(key.as_bytes(), serde_json::to_vec(doc)?);
        }
        tree.apply_batch(batch)?;
        self.db.flush()?;
        Ok(documents.len())
    }
}

fn document_key(doc: &Value) -> Option<&str> {
    KEY_FIELDS.iter().find_map(|field| doc.get(*field)?.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_upsert_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut store = StoreSink::open(dir.path()).unwrap();

        let docs = vec![json!({"_key": "a", "v": 1}), json!({"_key": "b", "v": 1})];
        assert_eq!(store.upsert("types", &docs).unwrap(), 2);
        assert_eq!(store.upsert("types", &docs).unwrap(), 2);
        assert_eq!(store.count("types").unwrap(), 2);

        store.upsert("types", &[json!({"_key": "a", "v": 2})]).unwrap();
        assert_eq!(store.count("types").unwrap(), 2);
        assert_eq!(store.get("types", "a").unwrap().unwrap()["v"], 2);
    }

    #[test]
    fn test_search_documents_keyed_by_id() {
        let dir = tempdir().unwrap();
        let mut store = StoreSink::open(dir.path()).unwrap();
        store
            .upsert("code_nodes", &[json!({"id": "pkg_mod_f", "qname": "pkg.mod.f"})])
            .unwrap();
        assert_eq!(store.keys("code_nodes").unwrap(), vec!["pkg_mod_f"]);
    }

    #[test]
    fn test_keyless_batch_is_rejected_whole() {
        let dir = tempdir().unwrap();
        let mut store = StoreSink::open(dir.path()).unwrap();
        let err = store
            .upsert("types", &[json!({"_key": "a"}), json!({"name": "no key"})])
            .unwrap_err();
        assert!(matches!(err, SinkError::MissingKey { .. }));
        assert_eq!(store.count("types").unwrap(), 0);
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let mut store = StoreSink::open(dir.path()).unwrap();
        store.upsert("calls", &[json!({"_key": "e1"})]).unwrap();
        assert_eq!(store.count("calls").unwrap(), 1);

        store.clear().unwrap();
        assert_eq!(store.count("calls").unwrap(), 0);
    }
}
