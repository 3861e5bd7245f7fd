// Key-value blob store: one JSON document per key

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const STORE_DIR: &str = ".listview";
const CURRENT_VERSION: u32 = 1;

/// Persistent store of named JSON values
///
/// Each key lives in `<key>.json`. Writers take an exclusive lock on
/// `<key>.lock` so read-modify-write cycles from separate processes do not
/// interleave.
#[derive(Debug, Clone)]
pub struct KvStore {
    base_path: PathBuf,
}

impl KvStore {
    /// Open or create a store at the given path
    ///
    /// The store will be created in a `.listview` subdirectory of the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().join(STORE_DIR);
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;

        let store = Self { base_path };
        store.write_version()?;

        debug!(path = ?store.base_path, "Opened key-value store");
        Ok(store)
    }

    /// Get the base path of this store
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn write_version(&self) -> Result<()> {
        let version_path = self.base_path.join(".version");
        if !version_path.exists() {
            fs::write(version_path, CURRENT_VERSION.to_string())?;
        }
        Ok(())
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.lock", key))
    }

    // ========================================================================
    // Key-value API
    // ========================================================================

    /// Read a value; `None` if the key has never been written
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        Self::validate_key(key)?;
        self.read_unlocked(key)
    }

    /// Overwrite a value
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        Self::validate_key(key)?;
        let _lock = self.lock(key)?;
        self.write_unlocked(key, value)
    }

    /// Read, transform, and write back a value while holding the key's lock
    ///
    /// `f` receives `None` when the key is unset. Returns whatever `f` returns
    /// alongside the stored value.
    pub fn update<T, R, F>(&self, key: &str, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> Result<(T, R)>,
    {
        Self::validate_key(key)?;
        let _lock = self.lock(key)?;

        let current = self.read_unlocked(key)?;
        let (next, result) = f(current)?;
        self.write_unlocked(key, &next)?;

        Ok(result)
    }

    /// Delete a key; returns whether it existed
    pub fn remove(&self, key: &str) -> Result<bool> {
        Self::validate_key(key)?;
        let _lock = self.lock(key)?;

        let path = self.value_path(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).with_context(|| format!("Failed to remove {:?}", path))?;
        info!(key, "Removed key");
        Ok(true)
    }

    /// All keys currently holding a value, sorted
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn lock(&self, key: &str) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(key))
            .context("Failed to open lock file")?;

        // Lock is released when the returned file is dropped
        file.lock_exclusive().context("Failed to acquire file lock")?;
        Ok(file)
    }

    fn read_unlocked<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.value_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        let value = serde_json::from_str(&content).with_context(|| format!("Corrupt value for key '{}'", key))?;
        Ok(Some(value))
    }

    /// Write to a temp file and rename, so readers never see a partial value
    fn write_unlocked<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.value_path(key);
        let tmp_path = self.base_path.join(format!("{}.json.tmp", key));

        let json = serde_json::to_string(value).context("Failed to serialize value")?;
        let mut file = File::create(&tmp_path).context("Failed to create temp file")?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &path).with_context(|| format!("Failed to replace {:?}", path))?;

        debug!(key, bytes = json.len(), "Wrote value");
        Ok(())
    }

    fn validate_key(key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(eyre!("Key cannot be empty"));
        }
        if key.len() > 64 {
            return Err(eyre!("Key too long: {} (max 64 chars)", key));
        }
        if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
            return Err(eyre!("Invalid key: {} (must be alphanumeric with _/-)", key));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_open_creates_directory() {
        let temp = TempDir::new().unwrap();

        let store = KvStore::open(temp.path()).unwrap();
        let store_path = temp.path().join(".listview");
        assert!(store_path.exists());
        assert!(store_path.join(".version").exists());
        assert_eq!(store.base_path(), store_path.as_path());
    }

    #[test]
    fn test_get_unset_key() {
        let temp = TempDir::new().unwrap();
        let store = KvStore::open(temp.path()).unwrap();

        let value: Option<Vec<String>> = store.get("cart").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_set_and_get() {
        let temp = TempDir::new().unwrap();
        let store = KvStore::open(temp.path()).unwrap();

        store.set("cart", &vec!["a".to_string(), "b".to_string()]).unwrap();
        let value: Vec<String> = store.get("cart").unwrap().unwrap();
        assert_eq!(value, vec!["a", "b"]);

        // Survives reopening
        let reopened = KvStore::open(temp.path()).unwrap();
        let value: Vec<String> = reopened.get("cart").unwrap().unwrap();
        assert_eq!(value.len(), 2);
    }

    #[test]
    fn test_update_read_modify_write() {
        let temp = TempDir::new().unwrap();
        let store = KvStore::open(temp.path()).unwrap();

        for i in 0..3 {
            let len = store
                .update("counter", |current: Option<Vec<i64>>| {
                    let mut items = current.unwrap_or_default();
                    items.push(i);
                    let len = items.len();
                    Ok((items, len))
                })
                .unwrap();
            assert_eq!(len, (i + 1) as usize);
        }

        let value: Vec<i64> = store.get("counter").unwrap().unwrap();
        assert_eq!(value, vec![0, 1, 2]);
    }

    #[test]
    fn test_update_error_leaves_value() {
        let temp = TempDir::new().unwrap();
        let store = KvStore::open(temp.path()).unwrap();
        store.set("cart", &vec![1]).unwrap();

        let result: Result<()> = store.update("cart", |_: Option<Vec<i32>>| Err(eyre!("nope")));
        assert!(result.is_err());

        let value: Vec<i32> = store.get("cart").unwrap().unwrap();
        assert_eq!(value, vec![1]);
    }

    #[test]
    fn test_corrupt_value_is_an_error() {
        let temp = TempDir::new().unwrap();
        let store = KvStore::open(temp.path()).unwrap();
        fs::write(store.base_path().join("cart.json"), "{not json").unwrap();

        let result: Result<Option<Vec<i32>>> = store.get("cart");
        assert!(result.is_err());
    }

    #[test]
    fn test_remove_and_keys() {
        let temp = TempDir::new().unwrap();
        let store = KvStore::open(temp.path()).unwrap();
        store.set("cart", &Vec::<i32>::new()).unwrap();
        store.set("saved-jobs", &vec![3]).unwrap();

        assert_eq!(store.keys().unwrap(), vec!["cart", "saved-jobs"]);
        assert!(store.remove("cart").unwrap());
        assert!(!store.remove("cart").unwrap());
        assert_eq!(store.keys().unwrap(), vec!["saved-jobs"]);
    }

    #[test]
    fn test_validate_key() {
        assert!(KvStore::validate_key("cart").is_ok());
        assert!(KvStore::validate_key("saved_jobs-2").is_ok());

        assert!(KvStore::validate_key("").is_err());
        assert!(KvStore::validate_key("../escape").is_err());
        assert!(KvStore::validate_key("a b").is_err());
        assert!(KvStore::validate_key(&"a".repeat(65)).is_err());
    }
}
