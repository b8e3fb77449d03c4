//! Allow-list backed by a configuration file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CatalogError, ObjectCatalog};

/// Configuration for the file-backed catalog.
#[derive(Debug)]
pub struct FileCatalogConfig {
    path: PathBuf,
}

impl FileCatalogConfig {
    /// Create a new config pointing at a YAML allow-list file.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: PathBuf::from(path.as_ref()),
        }
    }

    /// Path of the allow-list file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AllowListFile {
    objects: Vec<String>,
}

/// Allow-list loaded once from a YAML file.
///
/// The file lists the object keys the signer may issue URLs for:
///
/// ```yaml
/// objects:
///   - helloworld.html
///   - media/logo.png
/// ```
#[derive(Debug, Clone)]
pub struct FileCatalog {
    objects: HashSet<String>,
}

impl FileCatalog {
    /// Load the allow-list from the configured file.
    pub fn new(config: FileCatalogConfig) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(config.path())
            .map_err(|e| CatalogError::connection(e.to_string()))?;
        let parsed: AllowListFile =
            serde_yaml::from_str(&raw).map_err(|e| CatalogError::internal(e.to_string()))?;
        Ok(Self {
            objects: parsed.objects.into_iter().collect(),
        })
    }

    /// Build a catalog from an explicit list of keys.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            objects: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of allow-listed keys.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the allow-list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectCatalog for FileCatalog {
    async fn contains(&self, key: &str) -> Result<bool, CatalogError> {
        Ok(self.objects.contains(key))
    }
}
