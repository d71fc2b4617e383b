// Use case catalog: list config ids, fetch each, keep what parses

use crate::config::{self, UseCaseDescriptor};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where use case configs come from.
pub trait CatalogSource {
    /// Identifiers of every config document (e.g. file names)
    fn list(&self) -> Result<Vec<String>>;

    /// Raw JSON for one identifier
    fn fetch(&self, id: &str) -> Result<String>;
}

/// Config documents stored as `*.json` files in one directory.
#[derive(Debug, Clone)]
pub struct DirCatalog {
    root: PathBuf,
}

impl DirCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CatalogSource for DirCatalog {
    fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to list config directory {}", self.root.display()))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read config directory entry")?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".json") && entry.path().is_file() {
                ids.push(name);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn fetch(&self, id: &str) -> Result<String> {
        let path = self.root.join(id);
        fs::read_to_string(&path).with_context(|| format!("Failed to read config file {}", path.display()))
    }
}

/// Config documents served over HTTP: `GET {base}/list-config-files` for the
/// ids and `GET {base}/config/{id}` for each document.
pub struct HttpCatalog {
    base_url: reqwest::Url,
    client: reqwest::blocking::Client,
}

impl HttpCatalog {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = reqwest::Url::parse(base_url)
            .with_context(|| format!("Invalid catalog URL {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid catalog URL {}", base_url);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { base_url, client })
    }

    /// Base URL with `segments` appended, each percent-encoded
    fn url(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get(&self, url: reqwest::Url) -> Result<reqwest::blocking::Response> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Failed to fetch {}: HTTP {}", url, status);
        }
        Ok(response)
    }
}

impl CatalogSource for HttpCatalog {
    fn list(&self) -> Result<Vec<String>> {
        let url = self.url(&["list-config-files"]);
        self.get(url.clone())?
            .json::<Vec<String>>()
            .with_context(|| format!("Config list from {} is not a JSON array of names", url))
    }

    fn fetch(&self, id: &str) -> Result<String> {
        let url = self.url(&["config", id]);
        self.get(url.clone())?
            .text()
            .with_context(|| format!("Failed to read response from {}", url))
    }
}

/// A descriptor together with its catalog identifier
#[derive(Debug, Clone, PartialEq)]
pub struct UseCase {
    pub id: String,
    pub descriptor: UseCaseDescriptor,
}

/// Loaded use cases, grouped by category in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    use_cases: Vec<UseCase>,
    categories: IndexMap<String, Vec<usize>>,
}

impl Catalog {
    pub fn new(use_cases: Vec<UseCase>) -> Self {
        let mut categories: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (idx, uc) in use_cases.iter().enumerate() {
            categories.entry(uc.descriptor.category.clone()).or_default().push(idx);
        }
        Self { use_cases, categories }
    }

    pub fn len(&self) -> usize {
        self.use_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.use_cases.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&UseCase> {
        self.use_cases.iter().find(|uc| uc.id == id)
    }

    pub fn use_cases(&self) -> &[UseCase] {
        &self.use_cases
    }

    /// Categories with their use cases, both in first-seen order
    pub fn categories(&self) -> impl Iterator<Item = (&str, Vec<&UseCase>)> {
        self.categories.iter().map(|(name, idxs)| {
            (name.as_str(), idxs.iter().map(|&i| &self.use_cases[i]).collect())
        })
    }

    /// First use case of the first category
    pub fn default_use_case(&self) -> Option<&UseCase> {
        self.categories
            .values()
            .next()
            .and_then(|idxs| idxs.first())
            .map(|&i| &self.use_cases[i])
    }
}

/// Load every config the source lists.
///
/// Only a failure to list is an error. Entries that cannot be fetched or
/// parsed are logged and skipped; duplicate ids keep their first occurrence.
pub fn load_catalog(source: &dyn CatalogSource) -> Result<Catalog> {
    let ids = source.list().context("Failed to list use case configs")?;
    let mut seen = HashSet::new();
    let mut use_cases = Vec::with_capacity(ids.len());

    for id in ids {
        if !seen.insert(id.clone()) {
            tracing::warn!(id = %id, "duplicate config id, keeping the first");
            continue;
        }
        let raw = match source.fetch(&id) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(id = %id, error = %format!("{:#}", err), "skipping unreadable config");
                continue;
            }
        };
        match config::parse(&raw) {
            Ok(descriptor) => use_cases.push(UseCase { id, descriptor }),
            Err(err) => tracing::warn!(id = %id, error = %err, "skipping malformed config"),
        }
    }

    let catalog = Catalog::new(use_cases);
    tracing::info!(
        use_cases = catalog.len(),
        categories = catalog.categories.len(),
        "catalog loaded"
    );
    Ok(catalog)
}
