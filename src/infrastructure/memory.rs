//! In-memory object store for tests and mock mode.

use crate::domain::ports::ObjectStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object synchronously, for test setup.
    pub fn insert(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.objects
            .write()
            .expect("object map poisoned")
            .insert(key.to_string(), bytes.into());
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .objects
            .read()
            .expect("object map poisoned")
            .get(key)
            .cloned())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .objects
            .read()
            .expect("object map poisoned")
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.insert(key, bytes);
        Ok(())
    }
}
