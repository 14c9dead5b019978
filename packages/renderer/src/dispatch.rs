//! Per-section dispatch with fault isolation.
//!
//! The state machine for one section is terminal in all cases:
//!
//! ```text
//! dispatch → known type, render Ok   → rendered node
//!          → known type, render Err  → error placeholder
//!          → unknown type            → neutral placeholder
//! ```
//!
//! No retries: a render is synchronous and idempotent, so retrying has no
//! value until the underlying settings change.

use tracing::warn;
use vitrine_document::{PageDocument, Section};

use crate::context::RenderContext;
use crate::output::{RenderNode, RenderedPage};
use crate::registry::RendererRegistry;

/// Render one section, or `None` if it is hidden (skipped before dispatch,
/// not rendered as an empty placeholder).
pub fn render_section(
    registry: &RendererRegistry,
    section: &Section,
    ctx: &RenderContext,
) -> Option<RenderNode> {
    if section.is_hidden() {
        return None;
    }

    let Some(renderer) = registry.get(&section.section_type) else {
        // Unknown types are expected: the editor rolls out new types before
        // renderers catch up.
        return Some(RenderNode::placeholder(&section.section_type, &section.id));
    };

    match renderer.render(section, ctx) {
        Ok(node) => Some(node),
        Err(error) => {
            warn!(
                section_id = %section.id,
                section_type = %section.section_type,
                %error,
                "section renderer failed; substituting error placeholder"
            );
            Some(RenderNode::error(
                &section.section_type,
                &section.id,
                error.to_string(),
            ))
        }
    }
}

/// Render an ordered section list. One corrupt section yields exactly one
/// error node; every sibling still renders.
pub fn render_sections(
    registry: &RendererRegistry,
    sections: &[Section],
    ctx: &RenderContext,
) -> RenderedPage {
    let mut page = RenderedPage::new();
    for section in sections {
        if let Some(node) = render_section(registry, section, ctx) {
            page.add_node(node);
        }
    }
    page
}

/// Render a whole document: the draft sections in preview, or whatever
/// section view the storefront passed in for live serving.
pub fn render_document(
    registry: &RendererRegistry,
    document: &PageDocument,
    ctx: &RenderContext,
) -> RenderedPage {
    render_sections(registry, &document.sections, ctx)
}
