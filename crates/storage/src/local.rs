use std::path::PathBuf;

use async_trait::async_trait;

use crate::{join_url, validate_key, ObjectStorage, StorageError};

/// Stores objects as files under `root`; keys map to relative paths.
pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(root: PathBuf, public_base_url: &str) -> Self {
        Self {
            root,
            public_base_url: public_base_url.to_string(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(key, "Stored object on local disk");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&self.root) else {
                    continue;
                };
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.public_base_url, key)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(dir.path().to_path_buf(), "/uploads")
    }

    #[tokio::test]
    async fn put_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = storage(&dir);

        store.put("products/1/a.jpg", b"a".to_vec(), "image/jpeg").await.unwrap();
        store.put("products/2/b.jpg", b"b".to_vec(), "image/jpeg").await.unwrap();
        store.put("categories/3/c.png", b"c".to_vec(), "image/png").await.unwrap();

        assert_eq!(
            store.list("products/").await.unwrap(),
            vec!["products/1/a.jpg".to_string(), "products/2/b.jpg".to_string()]
        );
        assert_eq!(store.list("").await.unwrap().len(), 3);

        store.delete("products/1/a.jpg").await.unwrap();
        assert_eq!(store.list("products/").await.unwrap(), vec!["products/2/b.jpg".to_string()]);
        assert!(!dir.path().join("products/1/a.jpg").exists());
    }

    #[tokio::test]
    async fn deleting_missing_object_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        storage(&dir).delete("products/9/none.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn listing_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStorage::new(dir.path().join("missing"), "/uploads");
        assert!(store.list("products/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = storage(&dir).put("../escape.jpg", vec![1], "image/jpeg").await;
        assert_matches!(result, Err(StorageError::InvalidKey(_)));
    }

    #[test]
    fn public_url_uses_base() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(storage(&dir).public_url("products/1/a.jpg"), "/uploads/products/1/a.jpg");
    }
}
