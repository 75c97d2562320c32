//! Filesystem-backed object store.
//!
//! Keys map directly to paths under a root directory, so the store layout
//! mirrors the bucket layout the ingestion job writes
//! (`observations/2025-11-13.json`, `models/model.json`, ...).

use crate::domain::ports::ObjectStore;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        // Keys are logical paths; reject anything that would escape the root.
        if key.starts_with('/') || key.split('/').any(|part| part == "..") {
            bail!("invalid object key: {key}");
        }
        Ok(self.root.join(key))
    }

    fn collect_keys(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read store directory {dir:?}"))?
        {
            let path = entry?.path();
            if path.is_dir() {
                Self::collect_keys(root, &path, out)?;
            } else if let Ok(rel) = path.strip_prefix(root) {
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.resolve(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read object {key}")),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let root = self.root.clone();
        let prefix = prefix.to_string();
        // Directory walks stay on the blocking pool.
        let mut keys = tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
            if !root.exists() {
                return Ok(Vec::new());
            }
            let mut keys = Vec::new();
            Self::collect_keys(&root, &root, &mut keys)?;
            keys.retain(|k| k.starts_with(&prefix));
            Ok(keys)
        })
        .await
        .context("Store listing task failed")??;
        keys.sort();
        Ok(keys)
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create store directory {parent:?}"))?;
        }
        // Atomic write: temp file then rename.
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, bytes)
            .await
            .with_context(|| format!("Failed to write object {key}"))?;
        fs::rename(&temp_path, &path)
            .await
            .with_context(|| format!("Failed to finalize object {key}"))?;
        Ok(())
    }
}
