//! Document persistence.
//!
//! Handlers never talk to the driver directly: they go through
//! [`create_document`] and [`get_documents`], which work against any
//! [`DocumentStore`].

#[cfg(test)]
pub mod memory;
mod mongo;

pub use mongo::MongoStore;

use async_trait::async_trait;
use bson::{Bson, DateTime, Document};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database not available")]
    Unavailable,
    #[error("failed to encode document: {0}")]
    Serialize(#[from] bson::ser::Error),
    #[error(transparent)]
    Driver(mongodb::error::Error),
    /// The store refused the write itself (duplicate key, validator, write concern).
    #[error("write rejected: {0}")]
    Rejected(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        match e.kind.as_ref() {
            mongodb::error::ErrorKind::Write(_) => StoreError::Rejected(e.to_string()),
            _ => StoreError::Driver(e),
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Name of the database this store writes to.
    fn database_name(&self) -> &str;

    /// Insert one document and return the identifier the store assigned to it.
    async fn insert_document(&self, collection: &str, document: Document)
        -> Result<Bson, StoreError>;

    /// Up to `limit` documents whose fields equal those in `filter`, in natural order.
    async fn find_documents(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> Result<Vec<Document>, StoreError>;

    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError>;
}

/// Encode `record`, stamp it with `created_at`/`updated_at`, insert it, and
/// return the new identifier as text (24 hex digits for an ObjectId).
pub async fn create_document<R: Serialize>(
    store: &dyn DocumentStore,
    collection: &str,
    record: &R,
) -> Result<String, StoreError> {
    let mut document = bson::to_document(record)?;
    let now = DateTime::now();
    document.insert("created_at", now);
    document.insert("updated_at", now);

    let id = store.insert_document(collection, document).await?;
    debug!(collection, id=%id, "inserted document");
    Ok(id_text(&id))
}

/// Documents from `collection` matching `filter` exactly, at most `limit` of them.
pub async fn get_documents(
    store: &dyn DocumentStore,
    collection: &str,
    filter: Document,
    limit: u32,
) -> Result<Vec<Document>, StoreError> {
    // the driver reads a zero limit as "no limit"
    if limit == 0 {
        return Ok(Vec::new());
    }
    store
        .find_documents(collection, filter, i64::from(limit))
        .await
}

/// Text form of a document identifier.
pub fn id_text(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}
