//! Route → content lookup table.
//!
//! Built once per build from [`list_routes`](crate::resolve::list_routes):
//! every discovered file is loaded and stored under its route key. Page
//! rendering then looks content up by key instead of locating files from
//! route strings at render time.

use crate::content::{ContentError, ContentFile, PageMeta};
use crate::resolve::{self, RouteError, RouteSegments};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("Two content files map to route {0}")]
    DuplicateRoute(String),
}

/// Index entry: what a listing page needs to link to a post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    /// Route key, e.g. `intro/setup`.
    pub base_path: String,
    /// Route key percent-encoded for links.
    pub url_path: String,
    pub title: String,
    pub meta: PageMeta,
}

/// All loaded content for one build, keyed by route.
#[derive(Debug, Default)]
pub struct ContentRegistry {
    entries: BTreeMap<String, ContentFile>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover, resolve, and load every content file under `root`.
    pub fn build(root: &Path, extension: &str) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for route in resolve::list_routes(root, extension)? {
            registry.insert(ContentFile::load(route)?)?;
        }
        tracing::info!(pages = registry.len(), "content registry built");
        Ok(registry)
    }

    /// Add a loaded file. Fails if its route is already taken.
    pub fn insert(&mut self, file: ContentFile) -> Result<(), RegistryError> {
        match self.entries.entry(file.base_path()) {
            Entry::Occupied(e) => Err(RegistryError::DuplicateRoute(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(file);
                Ok(())
            }
        }
    }

    pub fn get(&self, route: &RouteSegments) -> Option<&ContentFile> {
        self.entries.get(&route.key())
    }

    /// Look up by `/`-joined key. Leading and trailing slashes are ignored.
    pub fn get_key(&self, key: &str) -> Option<&ContentFile> {
        RouteSegments::from_key(key).and_then(|route| self.get(&route))
    }

    /// Entries in route-key order.
    pub fn iter(&self) -> impl Iterator<Item = &ContentFile> {
        self.entries.values()
    }

    /// Entries that should be published.
    pub fn published(&self, include_drafts: bool) -> impl Iterator<Item = &ContentFile> {
        self.iter().filter(move |f| include_drafts || !f.meta.draft)
    }

    /// Index listing for published entries, in route-key order.
    pub fn summaries(&self, include_drafts: bool) -> Vec<PostSummary> {
        self.published(include_drafts)
            .map(|f| PostSummary {
                base_path: f.base_path(),
                url_path: f.route.url_path(),
                title: f.title.clone(),
                meta: f.meta.clone(),
            })
            .collect()
    }

    pub fn routes(&self) -> impl Iterator<Item = &RouteSegments> {
        self.iter().map(|f| &f.route)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
