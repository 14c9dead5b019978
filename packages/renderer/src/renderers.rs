//! Built-in storefront section renderers.
//!
//! Each renderer owns its settings schema: defaults for every key it reads,
//! and a typed reading of the bag that surfaces malformed values as
//! `RenderError` for the dispatcher to isolate.

use serde_json::{json, Value};
use vitrine_document::{Section, Settings};

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::output::RenderNode;
use crate::registry::SectionRenderer;
use crate::settings::{array_or_empty, bool_or, string_or, u64_or};

pub fn builtin_renderers() -> Vec<Box<dyn SectionRenderer>> {
    vec![
        Box::new(HeroRenderer),
        Box::new(ProductGridRenderer),
        Box::new(RichTextRenderer),
        Box::new(ImageBannerRenderer),
        Box::new(GalleryRenderer),
        Box::new(HeaderRenderer),
        Box::new(FooterRenderer),
        Box::new(AnnouncementBarRenderer),
    ]
}

fn settings_of(pairs: &[(&str, Value)]) -> Settings {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// Full-width banner with title, subtitle and call to action
pub struct HeroRenderer;

impl SectionRenderer for HeroRenderer {
    fn type_name(&self) -> &'static str {
        "hero"
    }

    fn default_settings(&self) -> Settings {
        settings_of(&[
            ("title", json!("Welcome")),
            ("subtitle", json!("")),
            ("ctaLabel", json!("")),
            ("ctaUrl", json!("#")),
        ])
    }

    fn render(&self, section: &Section, _ctx: &RenderContext) -> Result<RenderNode, RenderError> {
        let title = string_or(&section.settings, "title", "Welcome")?;
        let subtitle = string_or(&section.settings, "subtitle", "")?;
        let cta_label = string_or(&section.settings, "ctaLabel", "")?;
        let cta_url = string_or(&section.settings, "ctaUrl", "#")?;

        let mut node = RenderNode::element("section")
            .with_attr("class", "hero")
            .with_section_id(&section.id)
            .with_child(RenderNode::element("h1").with_child(RenderNode::text(title)));

        if !subtitle.is_empty() {
            node = node.with_child(RenderNode::element("p").with_child(RenderNode::text(subtitle)));
        }
        if !cta_label.is_empty() {
            node = node.with_child(
                RenderNode::element("a")
                    .with_attr("href", cta_url)
                    .with_attr("class", "hero-cta")
                    .with_child(RenderNode::text(cta_label)),
            );
        }

        Ok(node)
    }
}

/// Grid of products pulled from the opaque catalog provider
pub struct ProductGridRenderer;

impl SectionRenderer for ProductGridRenderer {
    fn type_name(&self) -> &'static str {
        "product-grid"
    }

    fn default_settings(&self) -> Settings {
        settings_of(&[
            ("collection", json!("all")),
            ("columns", json!(4)),
            ("limit", json!(8)),
        ])
    }

    fn render(&self, section: &Section, ctx: &RenderContext) -> Result<RenderNode, RenderError> {
        let collection = string_or(&section.settings, "collection", "all")?;
        let columns = u64_or(&section.settings, "columns", 4)?;
        let limit = u64_or(&section.settings, "limit", 8)?;

        let products = ctx.catalog.products(&collection, limit as usize);

        let cards = products
            .iter()
            .map(|product| {
                let title = product
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or("Untitled product");
                RenderNode::element("article")
                    .with_attr("class", "product-card")
                    .with_child(RenderNode::element("h3").with_child(RenderNode::text(title)))
            })
            .collect();

        Ok(RenderNode::element("section")
            .with_attr("class", "product-grid")
            .with_attr("data-columns", columns.to_string())
            .with_section_id(&section.id)
            .with_children(cards))
    }
}

pub struct RichTextRenderer;

impl SectionRenderer for RichTextRenderer {
    fn type_name(&self) -> &'static str {
        "rich-text"
    }

    fn default_settings(&self) -> Settings {
        settings_of(&[("content", json!(""))])
    }

    fn render(&self, section: &Section, _ctx: &RenderContext) -> Result<RenderNode, RenderError> {
        let content = string_or(&section.settings, "content", "")?;

        Ok(RenderNode::element("section")
            .with_attr("class", "rich-text")
            .with_section_id(&section.id)
            .with_child(RenderNode::text(content)))
    }
}

pub struct ImageBannerRenderer;

impl SectionRenderer for ImageBannerRenderer {
    fn type_name(&self) -> &'static str {
        "image-banner"
    }

    fn default_settings(&self) -> Settings {
        settings_of(&[("image", json!("")), ("alt", json!("")), ("caption", json!(""))])
    }

    fn render(&self, section: &Section, _ctx: &RenderContext) -> Result<RenderNode, RenderError> {
        // Asset URLs are opaque strings; the renderer never fetches them
        let image = string_or(&section.settings, "image", "")?;
        let alt = string_or(&section.settings, "alt", "")?;
        let caption = string_or(&section.settings, "caption", "")?;

        let mut node = RenderNode::element("figure")
            .with_attr("class", "image-banner")
            .with_section_id(&section.id)
            .with_child(
                RenderNode::element("img")
                    .with_attr("src", image)
                    .with_attr("alt", alt),
            );

        if !caption.is_empty() {
            node = node
                .with_child(RenderNode::element("figcaption").with_child(RenderNode::text(caption)));
        }

        Ok(node)
    }
}

/// Image gallery; `images` must be an array of URL strings or
/// `{ url, alt }` objects
pub struct GalleryRenderer;

impl SectionRenderer for GalleryRenderer {
    fn type_name(&self) -> &'static str {
        "gallery"
    }

    fn default_settings(&self) -> Settings {
        settings_of(&[("images", json!([]))])
    }

    fn render(&self, section: &Section, _ctx: &RenderContext) -> Result<RenderNode, RenderError> {
        let images = array_or_empty(&section.settings, "images")?;

        let mut items = Vec::with_capacity(images.len());
        for entry in &images {
            let node = match entry {
                Value::String(url) => RenderNode::element("img").with_attr("src", url),
                Value::Object(image) => {
                    let url = image.get("url").and_then(Value::as_str).unwrap_or("");
                    let alt = image.get("alt").and_then(Value::as_str).unwrap_or("");
                    RenderNode::element("img")
                        .with_attr("src", url)
                        .with_attr("alt", alt)
                }
                other => {
                    return Err(RenderError::Failed(format!(
                        "gallery image entries must be strings or objects, got {}",
                        other
                    )))
                }
            };
            items.push(node);
        }

        Ok(RenderNode::element("section")
            .with_attr("class", "gallery")
            .with_section_id(&section.id)
            .with_children(items))
    }
}

/// Composite section: logo plus `link` blocks as the nav
pub struct HeaderRenderer;

impl SectionRenderer for HeaderRenderer {
    fn type_name(&self) -> &'static str {
        "header"
    }

    fn default_settings(&self) -> Settings {
        settings_of(&[("logoText", json!("Shop"))])
    }

    fn render(&self, section: &Section, _ctx: &RenderContext) -> Result<RenderNode, RenderError> {
        let logo_text = string_or(&section.settings, "logoText", "Shop")?;

        let links = render_link_blocks(section)?;

        Ok(RenderNode::element("header")
            .with_attr("class", "site-header")
            .with_section_id(&section.id)
            .with_child(
                RenderNode::element("span")
                    .with_attr("class", "logo")
                    .with_child(RenderNode::text(logo_text)),
            )
            .with_child(RenderNode::element("nav").with_children(links)))
    }
}

pub struct FooterRenderer;

impl SectionRenderer for FooterRenderer {
    fn type_name(&self) -> &'static str {
        "footer"
    }

    fn default_settings(&self) -> Settings {
        settings_of(&[("copyright", json!(""))])
    }

    fn render(&self, section: &Section, _ctx: &RenderContext) -> Result<RenderNode, RenderError> {
        let copyright = string_or(&section.settings, "copyright", "")?;

        let links = render_link_blocks(section)?;

        let mut node = RenderNode::element("footer")
            .with_attr("class", "site-footer")
            .with_section_id(&section.id)
            .with_child(RenderNode::element("nav").with_children(links));

        if !copyright.is_empty() {
            node = node.with_child(
                RenderNode::element("small").with_child(RenderNode::text(copyright)),
            );
        }

        Ok(node)
    }
}

/// Rotating messages above the header; `message` blocks carry the copy
pub struct AnnouncementBarRenderer;

impl SectionRenderer for AnnouncementBarRenderer {
    fn type_name(&self) -> &'static str {
        "announcement-bar"
    }

    fn default_settings(&self) -> Settings {
        settings_of(&[("dismissible", json!(false))])
    }

    fn render(&self, section: &Section, _ctx: &RenderContext) -> Result<RenderNode, RenderError> {
        let dismissible = bool_or(&section.settings, "dismissible", false)?;

        let messages: Result<Vec<_>, RenderError> = section
            .blocks
            .iter()
            .filter(|b| b.block_type == "message")
            .map(|block| {
                let text = string_or(&block.settings, "text", "")?;
                Ok(RenderNode::element("p").with_child(RenderNode::text(text)))
            })
            .collect();

        Ok(RenderNode::element("aside")
            .with_attr("class", "announcement-bar")
            .with_attr("data-dismissible", dismissible.to_string())
            .with_section_id(&section.id)
            .with_children(messages?))
    }
}

/// Shared by header and footer: `link` blocks become anchors, other block
/// types are skipped (new block types roll out ahead of renderers too).
fn render_link_blocks(section: &Section) -> Result<Vec<RenderNode>, RenderError> {
    section
        .blocks
        .iter()
        .filter(|b| b.block_type == "link")
        .map(|block| {
            let label = string_or(&block.settings, "label", "")?;
            let url = string_or(&block.settings, "url", "#")?;
            Ok(RenderNode::element("a")
                .with_attr("href", url)
                .with_child(RenderNode::text(label)))
        })
        .collect()
}
