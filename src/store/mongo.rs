use super::{DocumentStore, StoreError};

use async_trait::async_trait;
use bson::{Bson, Document};
use futures_util::stream::TryStreamExt;
use mongodb::{
    options::{ClientOptions, FindOptions},
    Client, Database,
};
use tracing::info;

const APP_NAME: &str = "caller-dashboard";

/// MongoDB-backed store. The driver pools connections internally, so one
/// instance serves every request for the life of the process.
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Parse the connection string and bind to `database_name`. The driver
    /// connects lazily, so an unreachable server shows up on first use.
    pub async fn connect(database_url: &str, database_name: &str) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(database_url).await?;
        options.app_name = Some(APP_NAME.to_string());
        let client = Client::with_options(options)?;
        info!(database = database_name, "mongodb client ready");
        Ok(Self {
            db: client.database(database_name),
        })
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn database_name(&self) -> &str {
        self.db.name()
    }

    async fn insert_document(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<Bson, StoreError> {
        let result = self
            .db
            .collection::<Document>(collection)
            .insert_one(document, None)
            .await?;
        Ok(result.inserted_id)
    }

    async fn find_documents(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> Result<Vec<Document>, StoreError> {
        let options = FindOptions::builder().limit(limit).build();
        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(filter, options)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.db.list_collection_names(None).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bad_connection_string_is_a_driver_error() {
        let err = MongoStore::connect("not a mongodb url", "calls")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Driver(_)), "{err}");
    }

    #[test]
    fn non_write_failures_stay_driver_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = StoreError::from(mongodb::error::Error::from(io));
        assert!(matches!(err, StoreError::Driver(_)));
    }
}
