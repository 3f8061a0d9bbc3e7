//! Worker configuration.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::cache::paths;
use crate::error::{Result, WorkerError};
use crate::http::Request;

/// Version string naming the cache store.
pub const DEFAULT_CACHE_NAME: &str = "v2";

/// Origin the asset paths are relative to.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8000/";

/// Static assets pre-cached on install.
pub const DEFAULT_ASSETS: &[&str] = &[
    "app.css",
    "img/",
    "img/icon/",
    "img/icon/launchericon-144-144.png",
    "img/icon/launchericon-192-192.png",
    "img/icon/launchericon-48-48.png",
    "img/icon/launchericon-512-512.png",
    "img/icon/launchericon-72-72.png",
    "img/icon/launchericon-96-96.png",
    "index.html",
    "lemur/",
    "lemur/__init__.py",
    "lemur/__pycache__/",
    "lemur/__pycache__/__init__.cpython-312.pyc",
    "lemur/__pycache__/expensedb.cpython-312.pyc",
    "lemur/expensedb.py",
    "lemur/main.py",
    "puepy-0.3.0-py3-none-any.whl",
    "pyscript-config.toml",
    "serviceWorker.js",
];

/// Configuration for a worker: which cache it owns and what it pre-caches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Name of the single cache store the worker uses.
    pub cache_name: String,
    /// Base URL relative asset paths resolve against.
    pub origin: String,
    /// Relative asset paths, in install order.
    pub assets: Vec<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            assets: DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl WorkerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file. Fields left out keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| WorkerError::Config(format!("{}: {}", path.display(), e)))
    }

    #[must_use]
    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = name.into();
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    #[must_use]
    pub fn with_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets = assets.into_iter().map(Into::into).collect();
        self
    }

    /// Parsed origin URL.
    pub fn origin_url(&self) -> Result<Url> {
        Url::parse(&self.origin).map_err(|e| WorkerError::InvalidUrl {
            url: self.origin.clone(),
            reason: e.to_string(),
        })
    }

    /// Resolve a path against the origin.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.origin_url()?
            .join(path)
            .map_err(|e| WorkerError::InvalidUrl {
                url: path.to_string(),
                reason: e.to_string(),
            })
    }

    /// GET requests for every asset, in list order.
    pub fn asset_requests(&self) -> Result<Vec<Request>> {
        self.assets
            .iter()
            .map(|asset| self.resolve(asset).map(|url| Request::get(url.as_str())))
            .collect()
    }
}

/// Where the disk backend keeps its caches.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Explicit root; the platform cache directory when unset.
    pub root: Option<PathBuf>,
}

impl StorageConfig {
    pub fn root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => paths::default_root()
                .ok_or_else(|| WorkerError::Config("no cache directory for this platform".into())),
        }
    }
}
