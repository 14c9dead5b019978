use serde_json::Value;

/// Which document the dispatcher is consuming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// In-memory draft pushed from the editor
    Preview,
    /// Currently published content
    Live,
}

/// Opaque product source for catalog-consuming renderers. The dispatcher
/// never inspects product content; it hands values through to settings-driven
/// markup.
pub trait CatalogProvider {
    fn products(&self, collection: &str, limit: usize) -> Vec<Value>;
}

/// Catalog that has nothing to sell (previews, tests)
pub struct EmptyCatalog;

impl CatalogProvider for EmptyCatalog {
    fn products(&self, _collection: &str, _limit: usize) -> Vec<Value> {
        Vec::new()
    }
}

/// Context supplied to every section renderer
pub struct RenderContext<'a> {
    pub mode: RenderMode,
    pub catalog: &'a dyn CatalogProvider,
}

impl<'a> RenderContext<'a> {
    pub fn new(mode: RenderMode, catalog: &'a dyn CatalogProvider) -> Self {
        Self { mode, catalog }
    }

    pub fn live(catalog: &'a dyn CatalogProvider) -> Self {
        Self::new(RenderMode::Live, catalog)
    }

    pub fn preview(catalog: &'a dyn CatalogProvider) -> Self {
        Self::new(RenderMode::Preview, catalog)
    }
}
