use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One node in the rendered page tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RenderNode {
    /// Structural element
    Element {
        tag: String,
        attributes: HashMap<String, String>,
        children: Vec<RenderNode>,
        /// Source section, for editor hit-testing on the preview surface
        #[serde(skip_serializing_if = "Option::is_none")]
        section_id: Option<String>,
    },

    /// Text node
    Text { content: String },

    /// Neutral placeholder for a section type the dispatcher doesn't know
    Placeholder {
        section_type: String,
        section_id: String,
    },

    /// Error placeholder for a section whose renderer failed
    Error {
        section_type: String,
        section_id: String,
        reason: String,
    },
}

impl RenderNode {
    pub fn element(tag: impl Into<String>) -> Self {
        RenderNode::Element {
            tag: tag.into(),
            attributes: HashMap::new(),
            children: Vec::new(),
            section_id: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        RenderNode::Text {
            content: content.into(),
        }
    }

    pub fn placeholder(section_type: impl Into<String>, section_id: impl Into<String>) -> Self {
        RenderNode::Placeholder {
            section_type: section_type.into(),
            section_id: section_id.into(),
        }
    }

    pub fn error(
        section_type: impl Into<String>,
        section_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        RenderNode::Error {
            section_type: section_type.into(),
            section_id: section_id.into(),
            reason: reason.into(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let RenderNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: RenderNode) -> Self {
        if let RenderNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<RenderNode>) -> Self {
        if let RenderNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    pub fn with_section_id(mut self, id: impl Into<String>) -> Self {
        if let RenderNode::Element {
            section_id: ref mut sid,
            ..
        } = self
        {
            *sid = Some(id.into());
        }
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RenderNode::Error { .. })
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, RenderNode::Placeholder { .. })
    }
}

/// Rendered output for a whole page (one node per visible section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedPage {
    pub nodes: Vec<RenderNode>,
}

impl RenderedPage {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn add_node(&mut self, node: RenderNode) {
        self.nodes.push(node);
    }

    pub fn error_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_error()).count()
    }
}

impl Default for RenderedPage {
    fn default() -> Self {
        Self::new()
    }
}
