pub mod file_store;
pub mod memory;
pub mod persistence;
pub mod schema;

use std::future::Future;
use std::sync::Arc;

use crate::error::StoreError;

/// String key-value storage behind the persistence adapter. Values are JSON
/// text; the adapter owns (de)serialization.
pub trait KvStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    fn put(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn keys(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;
}

impl<S: KvStore + Send + Sync> KvStore for Arc<S> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send {
        self.as_ref().get(key)
    }

    fn put(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.as_ref().put(key, value)
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.as_ref().remove(key)
    }

    fn keys(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send {
        self.as_ref().keys()
    }
}
