//! # Section Mutations
//!
//! High-level semantic operations on a page's section list.
//!
//! ## Design Principles
//!
//! 1. **Pure**: every operation takes the current sections and returns a new
//!    sequence; callers replace document state and record history.
//! 2. **Infallible**: a missing ID is a defined no-op, never an error. Edits
//!    race with concurrent deletions (e.g. a section deleted mid-drag), so
//!    the API absorbs stale targets silently.
//! 3. **Intent-preserving**: each variant is one user-visible operation, so
//!    it serializes cleanly for transport and logging.
//!
//! ## Mutation Semantics
//!
//! ### UpdateSection
//! - Shallow merge of the partial settings into the target's bag
//! - Other sections and ordering untouched
//!
//! ### DuplicateSection
//! - Deep copy inserted immediately after the original
//! - Fresh IDs for the copy and all its blocks; settings copied by value
//!
//! ### Reorder
//! - Moves `from_id` immediately before/after `to_id`
//! - No-op when `from_id == to_id` or either is missing
//!
//! ### Bulk variants
//! - Observably equivalent to applying the single-item operation
//!   sequentially; the session records them as ONE history entry

use serde::{Deserialize, Serialize};
use vitrine_document::{Block, IdGenerator, Section, SectionDefaults, Settings};

/// Drop position relative to a reorder target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Before,
    After,
}

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Add a new section of the given type with its registered defaults
    AddSection {
        section_type: String,
        #[serde(default = "default_at_end")]
        at_end: bool,
    },

    /// Shallow-merge partial settings into the target section
    UpdateSection { id: String, settings: Settings },

    /// Remove a section
    DeleteSection { id: String },

    /// Insert a deep copy immediately after the original
    DuplicateSection { id: String },

    /// Move a section immediately before/after a drop target
    Reorder {
        from_id: String,
        to_id: String,
        placement: Placement,
    },

    /// Append clipboard entries with freshly generated IDs
    Paste { clipboard: Clipboard },

    /// Toggle the soft-delete flag on one section
    SetHidden { id: String, hidden: bool },

    /// Remove a set of sections as one operation
    DeleteMany { ids: Vec<String> },

    /// Toggle the soft-delete flag across a set of sections
    SetHiddenMany { ids: Vec<String>, hidden: bool },

    /// Append a block to a composite section
    AddBlock {
        section_id: String,
        block_type: String,
    },

    /// Shallow-merge partial settings into a block
    UpdateBlock {
        section_id: String,
        block_id: String,
        settings: Settings,
    },

    /// Remove a block from a section
    DeleteBlock { section_id: String, block_id: String },

    /// Move a block within its section
    ReorderBlock {
        section_id: String,
        from_id: String,
        to_id: String,
        placement: Placement,
    },
}

fn default_at_end() -> bool {
    true
}

/// Detached copies of sections, IDs stripped; regenerated on paste
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clipboard {
    pub entries: Vec<ClipboardEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    #[serde(rename = "type")]
    pub section_type: String,

    #[serde(default)]
    pub settings: Settings,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<ClipboardBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardBlock {
    #[serde(rename = "type")]
    pub block_type: String,

    #[serde(default)]
    pub settings: Settings,
}

/// Produce a detached clipboard from the given section IDs, preserving the
/// order the sections appear in the document.
pub fn copy(sections: &[Section], ids: &[String]) -> Clipboard {
    let entries = sections
        .iter()
        .filter(|s| ids.iter().any(|id| *id == s.id))
        .map(|s| ClipboardEntry {
            section_type: s.section_type.clone(),
            settings: s.settings.clone(),
            blocks: s
                .blocks
                .iter()
                .map(|b| ClipboardBlock {
                    block_type: b.block_type.clone(),
                    settings: b.settings.clone(),
                })
                .collect(),
        })
        .collect();

    Clipboard { entries }
}

impl Mutation {
    /// Apply this mutation, producing a new section sequence.
    ///
    /// Never fails: missing IDs and unknown types are absorbed per the
    /// mutation contract. The caller feeds the previous sequence into
    /// history and replaces document state with the result.
    pub fn apply(
        &self,
        sections: &[Section],
        ids: &mut IdGenerator,
        defaults: &dyn SectionDefaults,
    ) -> Vec<Section> {
        match self {
            Mutation::AddSection {
                section_type,
                at_end,
            } => apply_add(sections, section_type, *at_end, ids, defaults),

            Mutation::UpdateSection { id, settings } => apply_update(sections, id, settings),

            Mutation::DeleteSection { id } => {
                apply_delete_many(sections, std::slice::from_ref(id))
            }

            Mutation::DuplicateSection { id } => apply_duplicate(sections, id, ids),

            Mutation::Reorder {
                from_id,
                to_id,
                placement,
            } => apply_reorder(sections, from_id, to_id, *placement),

            Mutation::Paste { clipboard } => apply_paste(sections, clipboard, ids),

            Mutation::SetHidden { id, hidden } => {
                apply_set_hidden_many(sections, std::slice::from_ref(id), *hidden)
            }

            Mutation::DeleteMany { ids: targets } => apply_delete_many(sections, targets),

            Mutation::SetHiddenMany {
                ids: targets,
                hidden,
            } => apply_set_hidden_many(sections, targets, *hidden),

            Mutation::AddBlock {
                section_id,
                block_type,
            } => apply_add_block(sections, section_id, block_type, ids),

            Mutation::UpdateBlock {
                section_id,
                block_id,
                settings,
            } => apply_update_block(sections, section_id, block_id, settings),

            Mutation::DeleteBlock {
                section_id,
                block_id,
            } => apply_delete_block(sections, section_id, block_id),

            Mutation::ReorderBlock {
                section_id,
                from_id,
                to_id,
                placement,
            } => apply_reorder_block(sections, section_id, from_id, to_id, *placement),
        }
    }

    /// Short label for logging and history descriptions
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::AddSection { .. } => "add_section",
            Mutation::UpdateSection { .. } => "update_section",
            Mutation::DeleteSection { .. } => "delete_section",
            Mutation::DuplicateSection { .. } => "duplicate_section",
            Mutation::Reorder { .. } => "reorder",
            Mutation::Paste { .. } => "paste",
            Mutation::SetHidden { .. } => "set_hidden",
            Mutation::DeleteMany { .. } => "delete_many",
            Mutation::SetHiddenMany { .. } => "set_hidden_many",
            Mutation::AddBlock { .. } => "add_block",
            Mutation::UpdateBlock { .. } => "update_block",
            Mutation::DeleteBlock { .. } => "delete_block",
            Mutation::ReorderBlock { .. } => "reorder_block",
        }
    }
}

fn apply_add(
    sections: &[Section],
    section_type: &str,
    at_end: bool,
    ids: &mut IdGenerator,
    defaults: &dyn SectionDefaults,
) -> Vec<Section> {
    let mut next: Vec<Section> = sections.to_vec();
    let mut section = Section::new(ids.new_id(), section_type);
    section.settings = defaults.defaults_for(section_type);

    if at_end {
        next.push(section);
    } else {
        next.insert(0, section);
    }
    next
}

fn apply_update(sections: &[Section], id: &str, partial: &Settings) -> Vec<Section> {
    sections
        .iter()
        .map(|s| {
            if s.id == id {
                let mut updated = s.clone();
                for (key, value) in partial {
                    updated.settings.insert(key.clone(), value.clone());
                }
                updated
            } else {
                s.clone()
            }
        })
        .collect()
}

fn apply_duplicate(sections: &[Section], id: &str, ids: &mut IdGenerator) -> Vec<Section> {
    let mut next: Vec<Section> = sections.to_vec();

    if let Some(index) = next.iter().position(|s| s.id == id) {
        let original = &next[index];
        let mut duplicate = original.clone();
        duplicate.id = ids.new_id();
        for block in &mut duplicate.blocks {
            block.id = ids.new_id();
        }
        next.insert(index + 1, duplicate);
    }

    next
}

fn apply_reorder(
    sections: &[Section],
    from_id: &str,
    to_id: &str,
    placement: Placement,
) -> Vec<Section> {
    let mut next: Vec<Section> = sections.to_vec();

    if from_id == to_id {
        return next;
    }

    let Some(from_index) = next.iter().position(|s| s.id == from_id) else {
        return next;
    };
    if !next.iter().any(|s| s.id == to_id) {
        return next;
    }

    let moved = next.remove(from_index);
    // Target index is recomputed after removal so the insert lands exactly
    // before/after the drop target.
    let Some(target_index) = next.iter().position(|s| s.id == to_id) else {
        return next;
    };

    let insert_at = match placement {
        Placement::Before => target_index,
        Placement::After => target_index + 1,
    };
    next.insert(insert_at, moved);
    next
}

fn apply_paste(sections: &[Section], clipboard: &Clipboard, ids: &mut IdGenerator) -> Vec<Section> {
    let mut next: Vec<Section> = sections.to_vec();

    for entry in &clipboard.entries {
        let mut section = Section::new(ids.new_id(), entry.section_type.clone());
        section.settings = entry.settings.clone();
        section.blocks = entry
            .blocks
            .iter()
            .map(|b| {
                let mut block = Block::new(ids.new_id(), b.block_type.clone());
                block.settings = b.settings.clone();
                block
            })
            .collect();
        next.push(section);
    }

    next
}

fn apply_delete_many(sections: &[Section], targets: &[String]) -> Vec<Section> {
    sections
        .iter()
        .filter(|s| !targets.iter().any(|id| *id == s.id))
        .cloned()
        .collect()
}

fn apply_set_hidden_many(sections: &[Section], targets: &[String], hidden: bool) -> Vec<Section> {
    sections
        .iter()
        .map(|s| {
            if targets.iter().any(|id| *id == s.id) {
                let mut updated = s.clone();
                updated.set_hidden(hidden);
                updated
            } else {
                s.clone()
            }
        })
        .collect()
}

fn apply_add_block(
    sections: &[Section],
    section_id: &str,
    block_type: &str,
    ids: &mut IdGenerator,
) -> Vec<Section> {
    let mut next: Vec<Section> = sections.to_vec();

    if let Some(section) = next.iter_mut().find(|s| s.id == section_id) {
        section.blocks.push(Block::new(ids.new_id(), block_type));
    }

    next
}

fn apply_update_block(
    sections: &[Section],
    section_id: &str,
    block_id: &str,
    partial: &Settings,
) -> Vec<Section> {
    let mut next: Vec<Section> = sections.to_vec();

    if let Some(section) = next.iter_mut().find(|s| s.id == section_id) {
        if let Some(block) = section.blocks.iter_mut().find(|b| b.id == block_id) {
            for (key, value) in partial {
                block.settings.insert(key.clone(), value.clone());
            }
        }
    }

    next
}

fn apply_delete_block(sections: &[Section], section_id: &str, block_id: &str) -> Vec<Section> {
    let mut next: Vec<Section> = sections.to_vec();

    if let Some(section) = next.iter_mut().find(|s| s.id == section_id) {
        section.blocks.retain(|b| b.id != block_id);
    }

    next
}

fn apply_reorder_block(
    sections: &[Section],
    section_id: &str,
    from_id: &str,
    to_id: &str,
    placement: Placement,
) -> Vec<Section> {
    let mut next: Vec<Section> = sections.to_vec();

    if from_id == to_id {
        return next;
    }

    if let Some(section) = next.iter_mut().find(|s| s.id == section_id) {
        let Some(from_index) = section.blocks.iter().position(|b| b.id == from_id) else {
            return next;
        };
        if !section.blocks.iter().any(|b| b.id == to_id) {
            return next;
        }

        let moved = section.blocks.remove(from_index);
        let Some(target_index) = section.blocks.iter().position(|b| b.id == to_id) else {
            return next;
        };
        let insert_at = match placement {
            Placement::Before => target_index,
            Placement::After => target_index + 1,
        };
        section.blocks.insert(insert_at, moved);
    }

    next
}
