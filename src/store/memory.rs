use super::{DocumentStore, StoreError};

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// In-process store for tests. A failing store rejects every call.
pub struct MemoryStore {
    name: String,
    failing: bool,
    // collection => documents in insertion order
    collections: Mutex<BTreeMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            failing: false,
            collections: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            failing: true,
            ..Self::new(name)
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::Rejected("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn database_name(&self) -> &str {
        &self.name
    }

    async fn insert_document(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<Bson, StoreError> {
        self.check()?;
        let id = Bson::ObjectId(ObjectId::new());
        document.insert("_id", id.clone());
        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn find_documents(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> Result<Vec<Document>, StoreError> {
        self.check()?;
        let collections = self.collections.lock().unwrap();
        let docs = collections.get(collection).map(Vec::as_slice).unwrap_or(&[]);
        Ok(docs
            .iter()
            .filter(|d| filter.iter().all(|(k, v)| d.get(k) == Some(v)))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        self.check()?;
        Ok(self.collections.lock().unwrap().keys().cloned().collect())
    }
}
