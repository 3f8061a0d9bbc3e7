// Disk-backed cache storage.
// Persists each cached request/response pair as a JSON file written atomically.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::task;

use crate::error::{Result, WorkerError};
use crate::http::{Request, Response};

use super::paths;
use super::{Cache, CacheStorage};

/// Wrapper for cached data with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    /// The cached data.
    pub data: T,
    /// When the data was cached.
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }
}

/// A stored request/response pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub request: Request,
    pub response: Response,
}

/// Metadata kept alongside each named cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheMeta {
    name: String,
}

/// Read cached JSON data from a file.
pub fn read_cached<T: DeserializeOwned>(path: &Path) -> Result<Option<CachedData<T>>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let cached: CachedData<T> = serde_json::from_str(&contents)?;
    Ok(Some(cached))
}

/// Write data to cache as JSON.
pub fn write_cached<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let cached = CachedData::new(data);
    let json = serde_json::to_string_pretty(&cached)?;

    // Write atomically via temp file
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Delete a cached file. Returns whether it existed.
fn delete(path: &Path) -> Result<bool> {
    if path.exists() {
        fs::remove_file(path)?;
        return Ok(true);
    }
    Ok(false)
}

/// Run filesystem work off the async runtime.
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|e| WorkerError::Other(format!("cache task failed: {}", e)))?
}

/// Named caches stored as directories under a root.
#[derive(Debug, Clone)]
pub struct DiskCacheStorage {
    root: PathBuf,
}

impl DiskCacheStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn open_blocking(root: PathBuf, name: String) -> Result<DiskCache> {
        let meta = paths::meta_path(&root, &name);
        if read_cached::<CacheMeta>(&meta)?.is_none() {
            write_cached(&meta, &CacheMeta { name: name.clone() })?;
        }
        fs::create_dir_all(paths::entries_dir(&root, &name))?;

        Ok(DiskCache { name, root })
    }

    fn keys_blocking(root: PathBuf) -> Result<Vec<String>> {
        let caches = root.join("caches");
        if !caches.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for dir in fs::read_dir(&caches)? {
            let meta = dir?.path().join("cache.json");
            if let Some(cached) = read_cached::<CacheMeta>(&meta)? {
                names.push(cached.data.name);
            }
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    type Cache = DiskCache;

    async fn open(&self, name: &str) -> Result<DiskCache> {
        let root = self.root.clone();
        let owned = name.to_string();
        blocking(move || Self::open_blocking(root, owned))
            .await
            .map_err(|e| WorkerError::CacheOpen {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }

    async fn has(&self, name: &str) -> Result<bool> {
        let meta = paths::meta_path(&self.root, name);
        blocking(move || Ok(meta.exists())).await
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let dir = paths::cache_dir(&self.root, name);
        blocking(move || {
            if !dir.exists() {
                return Ok(false);
            }
            fs::remove_dir_all(&dir)?;
            Ok(true)
        })
        .await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let root = self.root.clone();
        blocking(move || Self::keys_blocking(root)).await
    }
}

/// One named cache on disk.
#[derive(Debug, Clone)]
pub struct DiskCache {
    name: String,
    root: PathBuf,
}

impl DiskCache {
    fn entry_path(&self, request: &Request) -> PathBuf {
        paths::entry_path(&self.root, &self.name, &request.cache_key())
    }

    fn read_entry(&self, request: &Request) -> Result<Option<CacheEntry>> {
        Ok(read_cached::<CacheEntry>(&self.entry_path(request))?.map(|cached| cached.data))
    }

    fn keys_blocking(&self) -> Result<Vec<Request>> {
        let dir = paths::entries_dir(&self.root, &self.name);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut requests = Vec::new();
        for file in fs::read_dir(&dir)? {
            let path = file?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                if let Some(cached) = read_cached::<CacheEntry>(&path)? {
                    requests.push(cached.data.request);
                }
            }
        }
        requests.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(requests)
    }

    /// Write every entry to a staging file, then move them into place.
    /// Any failure removes the staged files and restores entries already replaced.
    fn put_all_blocking(&self, entries: Vec<(Request, Response)>) -> Result<()> {
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(entries.len());
        for (request, response) in entries {
            let target = self.entry_path(&request);
            let staging = target.with_extension("staged");
            let entry = CacheEntry { request, response };
            // A repeated request overwrites its own staging file; keep only the last.
            staged.retain(|(_, staged_target)| staged_target != &target);
            if let Err(err) = write_cached(&staging, &entry) {
                let _ = fs::remove_file(&staging);
                discard(&staged);
                return Err(err);
            }
            staged.push((staging, target));
        }

        let mut committed: Vec<(PathBuf, Option<Vec<u8>>)> = Vec::with_capacity(staged.len());
        for (index, (staging, target)) in staged.iter().enumerate() {
            let result = previous_contents(target)
                .and_then(|previous| fs::rename(staging, target).map(|()| previous));
            match result {
                Ok(previous) => committed.push((target.clone(), previous)),
                Err(err) => {
                    rollback(&committed);
                    discard(&staged[index..]);
                    return Err(err.into());
                }
            }
        }

        Ok(())
    }
}

/// Contents of an existing entry file, if any.
fn previous_contents(path: &Path) -> std::io::Result<Option<Vec<u8>>> {
    if path.is_file() {
        return fs::read(path).map(Some);
    }
    Ok(None)
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (staging, _) in staged {
        let _ = fs::remove_file(staging);
    }
}

fn rollback(committed: &[(PathBuf, Option<Vec<u8>>)]) {
    for (target, previous) in committed.iter().rev() {
        let _ = match previous {
            Some(contents) => fs::write(target, contents),
            None => fs::remove_file(target),
        };
    }
}

#[async_trait]
impl Cache for DiskCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_request(&self, request: &Request) -> Result<Option<Response>> {
        if !request.is_get() {
            return Ok(None);
        }

        let cache = self.clone();
        let request = request.clone();
        let entry = blocking(move || cache.read_entry(&request))
            .await
            .map_err(|e| WorkerError::CacheLookup(e.to_string()))?;
        Ok(entry.map(|entry| entry.response))
    }

    async fn put(&self, request: &Request, response: Response) -> Result<()> {
        if !request.is_get() {
            return Err(WorkerError::UnsupportedMethod(request.method.clone()));
        }

        let path = self.entry_path(request);
        let entry = CacheEntry {
            request: request.clone(),
            response,
        };
        blocking(move || write_cached(&path, &entry)).await
    }

    async fn delete(&self, request: &Request) -> Result<bool> {
        let path = self.entry_path(request);
        blocking(move || delete(&path)).await
    }

    async fn keys(&self) -> Result<Vec<Request>> {
        let cache = self.clone();
        blocking(move || cache.keys_blocking()).await
    }

    async fn put_all(&self, entries: Vec<(Request, Response)>) -> Result<()> {
        if let Some((request, _)) = entries.iter().find(|(request, _)| !request.is_get()) {
            return Err(WorkerError::UnsupportedMethod(request.method.clone()));
        }

        let cache = self.clone();
        blocking(move || cache.put_all_blocking(entries)).await
    }
}
