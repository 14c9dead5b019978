//! # Page Persistence
//!
//! The persistence seam between the editor core and wherever pages actually
//! live. The core treats this as an opaque service: load, save draft,
//! publish, rollback, export/import. Two implementations ship here:
//!
//! - [`MemoryStore`]: in-process map, for tests and ephemeral previews
//! - [`FileStore`]: one pretty-printed JSON file per page under a root dir
//!
//! Publishing is atomic from the caller's perspective: the version append and
//! live-pointer flip happen inside one store call, and a failed call leaves
//! the draft untouched with no partial version.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use vitrine_document::{append_version, PageDocument, PageStatus, Section, Version};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("page not found: {0}")]
    NotFound(String),

    #[error("version {index} not found for page {slug}")]
    VersionNotFound { slug: String, index: u32 },

    #[error("page already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid slug: {0}")]
    InvalidSlug(String),

    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Exported/imported page layout blob. Carries the layout only; version
/// history stays with the source page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTemplate {
    pub slug: String,
    pub sections: Vec<Section>,
}

/// Opaque page persistence service
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Load a page. `NotFound` is a distinct outcome the editor must surface;
    /// it never silently substitutes an empty document (the next auto-save
    /// would overwrite a real page).
    async fn load(&self, slug: &str) -> Result<PageDocument, StoreError>;

    /// Persist draft sections. Idempotent; creates the page on first save.
    async fn save_draft(
        &self,
        slug: &str,
        sections: Vec<Section>,
    ) -> Result<PageDocument, StoreError>;

    /// Append the current draft as a new version and flip the live pointer
    async fn publish(&self, slug: &str) -> Result<Version, StoreError>;

    /// Republish a past version's content as a NEW version. History is
    /// append-only: nothing is renumbered or deleted.
    async fn rollback(&self, slug: &str, version_index: u32) -> Result<Version, StoreError>;

    /// Serialize the page's draft layout as a portable blob
    async fn export_template(&self, slug: &str) -> Result<Vec<u8>, StoreError>;

    /// Create a page from an exported blob. Refuses to replace an existing
    /// page unless `overwrite` is set.
    async fn import_template(
        &self,
        bytes: &[u8],
        slug: &str,
        overwrite: bool,
    ) -> Result<PageDocument, StoreError>;

    async fn list_pages(&self) -> Result<Vec<String>, StoreError>;
}

fn publish_document(document: &mut PageDocument) -> Version {
    let version = append_version(&mut document.version_history, document.sections.clone());
    document.status = PageStatus::Published;
    version
}

fn rollback_document(document: &mut PageDocument, version_index: u32) -> Option<Version> {
    let target = document.find_version(version_index)?.sections.clone();
    document.sections = target;
    Some(publish_document(document))
}

fn template_from(document: &PageDocument) -> PageTemplate {
    PageTemplate {
        slug: document.slug.clone(),
        sections: document.sections.clone(),
    }
}

fn document_from_template(template: PageTemplate, slug: &str) -> PageDocument {
    let mut document = PageDocument::new(slug);
    document.sections = template.sections;
    document
}

// ── In-memory store ─────────────────────────────────────────────────

/// Map-backed store for tests and ephemeral sessions
pub struct MemoryStore {
    pages: Mutex<HashMap<String, PageDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn load(&self, slug: &str) -> Result<PageDocument, StoreError> {
        self.pages
            .lock()
            .unwrap()
            .get(slug)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))
    }

    async fn save_draft(
        &self,
        slug: &str,
        sections: Vec<Section>,
    ) -> Result<PageDocument, StoreError> {
        let mut pages = self.pages.lock().unwrap();
        let document = pages
            .entry(slug.to_string())
            .or_insert_with(|| PageDocument::new(slug));
        document.sections = sections;
        document.status = PageStatus::Draft;
        Ok(document.clone())
    }

    async fn publish(&self, slug: &str) -> Result<Version, StoreError> {
        let mut pages = self.pages.lock().unwrap();
        let document = pages
            .get_mut(slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))?;
        Ok(publish_document(document))
    }

    async fn rollback(&self, slug: &str, version_index: u32) -> Result<Version, StoreError> {
        let mut pages = self.pages.lock().unwrap();
        let document = pages
            .get_mut(slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))?;
        rollback_document(document, version_index).ok_or(StoreError::VersionNotFound {
            slug: slug.to_string(),
            index: version_index,
        })
    }

    async fn export_template(&self, slug: &str) -> Result<Vec<u8>, StoreError> {
        let document = self.load(slug).await?;
        Ok(serde_json::to_vec_pretty(&template_from(&document))?)
    }

    async fn import_template(
        &self,
        bytes: &[u8],
        slug: &str,
        overwrite: bool,
    ) -> Result<PageDocument, StoreError> {
        let template: PageTemplate = serde_json::from_slice(bytes)
            .map_err(|e| StoreError::InvalidTemplate(e.to_string()))?;

        let mut pages = self.pages.lock().unwrap();
        if pages.contains_key(slug) && !overwrite {
            return Err(StoreError::AlreadyExists(slug.to_string()));
        }

        let document = document_from_template(template, slug);
        pages.insert(slug.to_string(), document.clone());
        Ok(document)
    }

    async fn list_pages(&self) -> Result<Vec<String>, StoreError> {
        let mut slugs: Vec<String> = self.pages.lock().unwrap().keys().cloned().collect();
        slugs.sort();
        Ok(slugs)
    }
}

// ── File-backed store ───────────────────────────────────────────────

/// One JSON file per page under a root directory
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn page_path(&self, slug: &str) -> Result<PathBuf, StoreError> {
        validate_slug(slug)?;
        Ok(self.root.join(format!("{slug}.json")))
    }

    fn read_page(&self, slug: &str) -> Result<PageDocument, StoreError> {
        let path = self.page_path(slug)?;
        if !path.exists() {
            return Err(StoreError::NotFound(slug.to_string()));
        }
        let bytes = std::fs::read(&path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write_page(&self, document: &PageDocument) -> Result<(), StoreError> {
        let path = self.page_path(&document.slug)?;
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(&path, serde_json::to_vec_pretty(document)?)?;
        Ok(())
    }
}

/// Slugs become file names; anything that could escape the root is rejected
fn validate_slug(slug: &str) -> Result<(), StoreError> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidSlug(slug.to_string()))
    }
}

#[async_trait]
impl PageStore for FileStore {
    async fn load(&self, slug: &str) -> Result<PageDocument, StoreError> {
        self.read_page(slug)
    }

    async fn save_draft(
        &self,
        slug: &str,
        sections: Vec<Section>,
    ) -> Result<PageDocument, StoreError> {
        let mut document = match self.read_page(slug) {
            Ok(document) => document,
            Err(StoreError::NotFound(_)) => PageDocument::new(slug),
            Err(e) => return Err(e),
        };
        document.sections = sections;
        document.status = PageStatus::Draft;
        self.write_page(&document)?;
        Ok(document)
    }

    async fn publish(&self, slug: &str) -> Result<Version, StoreError> {
        let mut document = self.read_page(slug)?;
        let version = publish_document(&mut document);
        self.write_page(&document)?;
        info!(slug, version = version.version_index, "published page");
        Ok(version)
    }

    async fn rollback(&self, slug: &str, version_index: u32) -> Result<Version, StoreError> {
        let mut document = self.read_page(slug)?;
        let version =
            rollback_document(&mut document, version_index).ok_or(StoreError::VersionNotFound {
                slug: slug.to_string(),
                index: version_index,
            })?;
        self.write_page(&document)?;
        info!(
            slug,
            from = version_index,
            to = version.version_index,
            "rolled back page"
        );
        Ok(version)
    }

    async fn export_template(&self, slug: &str) -> Result<Vec<u8>, StoreError> {
        let document = self.read_page(slug)?;
        Ok(serde_json::to_vec_pretty(&template_from(&document))?)
    }

    async fn import_template(
        &self,
        bytes: &[u8],
        slug: &str,
        overwrite: bool,
    ) -> Result<PageDocument, StoreError> {
        let template: PageTemplate = serde_json::from_slice(bytes)
            .map_err(|e| StoreError::InvalidTemplate(e.to_string()))?;

        let path = self.page_path(slug)?;
        if path.exists() && !overwrite {
            return Err(StoreError::AlreadyExists(slug.to_string()));
        }

        let document = document_from_template(template, slug);
        self.write_page(&document)?;
        Ok(document)
    }

    async fn list_pages(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut slugs = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    slugs.push(stem.to_string());
                }
            }
        }
        slugs.sort();
        Ok(slugs)
    }
}
