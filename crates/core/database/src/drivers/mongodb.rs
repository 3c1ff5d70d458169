use std::ops::Deref;

use futures::StreamExt;
use mongodb::bson::Document;
use mongodb::error::Result;
use mongodb::results::{DeleteResult, InsertOneResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

database_derived!(
    /// MongoDB implementation
    pub struct MongoDb(pub ::mongodb::Client, pub String);
);

impl Deref for MongoDb {
    type Target = mongodb::Client;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[allow(dead_code)]
impl MongoDb {
    /// Get the Warden database
    pub fn db(&self) -> mongodb::Database {
        self.database(&self.1)
    }

    /// Get a collection by its name
    pub fn col<T: Send + Sync>(&self, collection: &str) -> mongodb::Collection<T> {
        self.db().collection(collection)
    }

    /// Insert one document into a collection
    pub async fn insert_one<T: Serialize + Send + Sync>(
        &self,
        collection: &'static str,
        document: T,
    ) -> Result<InsertOneResult> {
        self.col::<T>(collection).insert_one(document).await
    }

    /// Find one document in a collection
    pub async fn find_one<T: DeserializeOwned + Send + Sync>(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> Result<Option<T>> {
        self.col::<T>(collection).find_one(filter).await
    }

    /// Find multiple documents in a collection
    pub async fn find<T: DeserializeOwned + Send + Sync>(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> Result<Vec<T>> {
        Ok(self
            .col::<T>(collection)
            .find(filter)
            .await?
            .filter_map(|s| async {
                if cfg!(debug_assertions) {
                    // Hard fail on invalid documents
                    Some(s.unwrap())
                } else {
                    s.ok()
                }
            })
            .collect::<Vec<T>>()
            .await)
    }

    /// Delete all documents matching a filter
    pub async fn delete_many(
        &self,
        collection: &'static str,
        filter: Document,
    ) -> Result<DeleteResult> {
        self.col::<Document>(collection).delete_many(filter).await
    }
}
