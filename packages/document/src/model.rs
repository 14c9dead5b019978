use serde::{Deserialize, Serialize};
use serde_json::Value;
use vitrine_common::CommonResult;

use crate::id::IdGenerator;
use crate::version::Version;

/// Untyped settings bag. Each renderer defines its own expected keys and
/// defaults; the model enforces nothing beyond JSON-serializability.
pub type Settings = serde_json::Map<String, Value>;

/// One ordered, independently rendered unit of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Unique within a document, stable across edits, never reused
    pub id: String,

    /// Open-ended type tag; unrecognized values are legal
    #[serde(rename = "type")]
    pub section_type: String,

    #[serde(default)]
    pub settings: Settings,

    /// Sub-elements for composite sections (header, footer, announcement bar)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}

/// A sub-element within a composite section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,

    #[serde(rename = "type")]
    pub block_type: String,

    #[serde(default)]
    pub settings: Settings,
}

impl Section {
    pub fn new(id: impl Into<String>, section_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            section_type: section_type.into(),
            settings: Settings::new(),
            blocks: Vec::new(),
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Soft-delete flag: hidden sections stay in the document and history but
    /// are skipped at render time.
    pub fn is_hidden(&self) -> bool {
        self.settings
            .get("hidden")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.settings.insert("hidden".to_string(), Value::Bool(hidden));
    }

    pub fn find_block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == block_id)
    }
}

impl Block {
    pub fn new(id: impl Into<String>, block_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            settings: Settings::new(),
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }
}

/// Editing status of a page document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Draft,
    Published,
}

/// The full editable representation of one storefront page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    /// Storefront route identity ("home", or a custom slug)
    pub slug: String,

    /// Render order is insertion order
    pub sections: Vec<Section>,

    pub status: PageStatus,

    /// Append-only published snapshots
    #[serde(default)]
    pub version_history: Vec<Version>,
}

impl PageDocument {
    /// Create an empty draft document
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            sections: Vec::new(),
            status: PageStatus::Draft,
            version_history: Vec::new(),
        }
    }

    /// Create a draft from the fallback starter template
    pub fn from_template(slug: impl Into<String>, ids: &mut IdGenerator) -> Self {
        let slug = slug.into();
        let hero = Section::new(ids.new_id(), "hero")
            .with_setting("title", Value::String("Welcome to our store".to_string()))
            .with_setting("subtitle", Value::String("Shop the latest arrivals".to_string()));
        let grid = Section::new(ids.new_id(), "product-grid")
            .with_setting("collection", Value::String("featured".to_string()));
        let footer = Section::new(ids.new_id(), "footer")
            .with_block(
                Block::new(ids.new_id(), "link")
                    .with_setting("label", Value::String("About".to_string()))
                    .with_setting("url", Value::String("/about".to_string())),
            )
            .with_block(
                Block::new(ids.new_id(), "link")
                    .with_setting("label", Value::String("Contact".to_string()))
                    .with_setting("url", Value::String("/contact".to_string())),
            );

        Self {
            slug,
            sections: vec![hero, grid, footer],
            status: PageStatus::Draft,
            version_history: Vec::new(),
        }
    }

    pub fn find_section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn find_section_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    pub fn section_index(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    /// The live pointer: content currently served to the storefront, if the
    /// page has ever been published.
    pub fn latest_version(&self) -> Option<&Version> {
        self.version_history.last()
    }

    pub fn find_version(&self, version_index: u32) -> Option<&Version> {
        self.version_history
            .iter()
            .find(|v| v.version_index == version_index)
    }

    pub fn to_json(&self) -> CommonResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> CommonResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdGenerator;
    use serde_json::json;

    #[test]
    fn test_hidden_flag_defaults_to_false() {
        let section = Section::new("s-1", "hero");
        assert!(!section.is_hidden());
    }

    #[test]
    fn test_hidden_flag_round_trip() {
        let mut section = Section::new("s-1", "hero");
        section.set_hidden(true);
        assert!(section.is_hidden());
        section.set_hidden(false);
        assert!(!section.is_hidden());
    }

    #[test]
    fn test_non_boolean_hidden_is_ignored() {
        let section = Section::new("s-1", "hero").with_setting("hidden", json!("yes"));
        assert!(!section.is_hidden());
    }

    #[test]
    fn test_document_json_round_trip() {
        let mut ids = IdGenerator::new("home");
        let doc = PageDocument::from_template("home", &mut ids);

        let bytes = doc.to_json().unwrap();
        let restored = PageDocument::from_json(&bytes).unwrap();

        assert_eq!(doc, restored);
    }

    #[test]
    fn test_section_type_serializes_as_type() {
        let section = Section::new("s-1", "hero");
        let value = serde_json::to_value(&section).unwrap();
        assert_eq!(value["type"], json!("hero"));
    }

    #[test]
    fn test_unknown_section_type_deserializes() {
        let value = json!({
            "id": "s-9",
            "type": "not-a-real-type",
            "settings": { "anything": [1, 2, 3] }
        });
        let section: Section = serde_json::from_value(value).unwrap();
        assert_eq!(section.section_type, "not-a-real-type");
        assert!(section.blocks.is_empty());
    }

    #[test]
    fn test_template_sections_have_unique_ids() {
        let mut ids = IdGenerator::new("home");
        let doc = PageDocument::from_template("home", &mut ids);

        let mut seen = std::collections::HashSet::new();
        for section in &doc.sections {
            assert!(seen.insert(section.id.clone()));
            for block in &section.blocks {
                assert!(seen.insert(block.id.clone()));
            }
        }
    }
}
