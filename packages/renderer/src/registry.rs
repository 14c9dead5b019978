use std::collections::HashMap;

use vitrine_document::{Section, SectionDefaults, Settings};

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::output::RenderNode;
use crate::renderers;

/// One registered section type: owns its default settings and its reading of
/// the untyped bag.
pub trait SectionRenderer: Send + Sync {
    fn type_name(&self) -> &'static str;

    /// Defaults applied when a section of this type is added in the editor
    fn default_settings(&self) -> Settings;

    fn render(&self, section: &Section, ctx: &RenderContext) -> Result<RenderNode, RenderError>;
}

/// Maps section types to renderers. The set is open-ended: unregistered types
/// are legal documents and dispatch to a neutral placeholder.
pub struct RendererRegistry {
    renderers: HashMap<&'static str, Box<dyn SectionRenderer>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// Registry with the storefront's built-in section set
    pub fn with_builtin_sections() -> Self {
        let mut registry = Self::new();
        for renderer in renderers::builtin_renderers() {
            registry.register(renderer);
        }
        registry
    }

    pub fn register(&mut self, renderer: Box<dyn SectionRenderer>) {
        self.renderers.insert(renderer.type_name(), renderer);
    }

    pub fn get(&self, section_type: &str) -> Option<&dyn SectionRenderer> {
        self.renderers.get(section_type).map(|r| r.as_ref())
    }

    pub fn known_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.renderers.keys().copied().collect();
        types.sort_unstable();
        types
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_builtin_sections()
    }
}

/// The registry is the canonical defaults provider for the mutation layer:
/// adding a section resolves its type here, unknown types get an empty bag.
impl SectionDefaults for RendererRegistry {
    fn defaults_for(&self, section_type: &str) -> Settings {
        self.get(section_type)
            .map(|r| r.default_settings())
            .unwrap_or_default()
    }
}
