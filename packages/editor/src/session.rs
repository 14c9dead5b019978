//! # Editor Session
//!
//! Owns document truth for one editing surface.
//!
//! An `EditorSession` is the single owner of the in-memory page document.
//! The host UI dispatches mutations and observes state; it never holds a
//! mutable document of its own. Every mutation produces a fresh section
//! sequence which the session records in history and installs as current
//! state. Undo and redo restore snapshots through a suppression latch so the
//! restore itself is not re-recorded.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vitrine_document::{
    IdGenerator, PageDocument, PageStatus, Section, SectionDefaults, Version,
};

use crate::errors::EditorError;
use crate::history::History;
use crate::mutations::{copy, Clipboard, Mutation};
use crate::publish::{PublishGate, PublishState};

/// Save status surfaced to the host chrome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
    Saved,
    Saving,
    Dirty,
    Error,
}

/// Single editing session over one page document
pub struct EditorSession {
    document: PageDocument,

    history: History,

    ids: IdGenerator,

    /// Per-type default settings, owned by the renderer registry
    defaults: Arc<dyn SectionDefaults + Send + Sync>,

    /// Current selection (section IDs)
    selected: Vec<String>,

    /// Unsaved local changes since the last successful draft save
    dirty: bool,

    gate: PublishGate,
}

impl EditorSession {
    /// Open a session over a loaded document. History starts at the loaded
    /// state, so server-fetched content is never an undoable past.
    pub fn new(
        document: PageDocument,
        defaults: Arc<dyn SectionDefaults + Send + Sync>,
    ) -> Self {
        let ids = IdGenerator::resuming(&document.slug, &document.sections);
        let mut history = History::new();
        history.reset(document.sections.clone());

        Self {
            document,
            history,
            ids,
            defaults,
            selected: Vec::new(),
            dirty: false,
            gate: PublishGate::new(),
        }
    }

    /// Open a session on the fallback starter template. This is an explicit
    /// user choice; a failed load must never silently land here, or the next
    /// auto-save would overwrite a real page.
    pub fn start_fresh(
        slug: impl Into<String>,
        defaults: Arc<dyn SectionDefaults + Send + Sync>,
    ) -> Self {
        let slug = slug.into();
        let mut ids = IdGenerator::new(&slug);
        let document = PageDocument::from_template(slug, &mut ids);

        let mut session = Self::new(document, defaults);
        session.ids = ids;
        session.dirty = true; // template content exists only locally
        session
    }

    /// Apply one mutation: compute the next section sequence, install it,
    /// and record a history entry. Bulk mutations land as a single entry.
    pub fn apply(&mut self, mutation: &Mutation) {
        debug!(kind = mutation.kind(), slug = %self.document.slug, "applying mutation");

        let next = mutation.apply(&self.document.sections, &mut self.ids, self.defaults.as_ref());
        self.install(next);
    }

    /// Restore the previous snapshot. Returns false when at the oldest state.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.history.begin_restore();
        self.install(snapshot);
        true
    }

    /// Restore the next snapshot. Returns false when at the newest state.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.history.begin_restore();
        self.install(snapshot);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Copy sections to a detached clipboard (IDs stripped)
    pub fn copy(&self, ids: &[String]) -> Clipboard {
        copy(&self.document.sections, ids)
    }

    /// Copy the current selection
    pub fn copy_selection(&self) -> Clipboard {
        copy(&self.document.sections, &self.selected)
    }

    pub fn set_selection(&mut self, ids: Vec<String>) {
        self.selected = ids;
    }

    pub fn selection(&self) -> &[String] {
        &self.selected
    }

    pub fn document(&self) -> &PageDocument {
        &self.document
    }

    pub fn sections(&self) -> &[Section] {
        &self.document.sections
    }

    pub fn slug(&self) -> &str {
        &self.document.slug
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// A draft save completed for the state the caller snapshotted. Edits
    /// that landed after that snapshot have re-marked the session dirty and
    /// will be captured by the next save cycle.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn publish_state(&self) -> PublishState {
        self.gate.state()
    }

    /// Start a publish: locks the gate and returns the exact sections to
    /// send. Further local edits are allowed while the request is in flight.
    pub fn begin_publish(&mut self) -> Result<Vec<Section>, EditorError> {
        self.gate.begin()?;
        Ok(self.document.sections.clone())
    }

    /// The publish request succeeded with the server-assigned version.
    pub fn complete_publish(&mut self, version: Version) {
        debug!(slug = %self.document.slug, version = version.version_index, "publish complete");
        self.gate.complete();
        if self.document.find_version(version.version_index).is_none() {
            self.document.version_history.push(version);
        }
        self.document.status = PageStatus::Published;
    }

    /// The publish request failed; the draft is untouched and retryable.
    pub fn fail_publish(&mut self) {
        self.gate.fail();
    }

    /// Replace current sections, recording history unless a restore latch is
    /// armed. This is the only write path to document state.
    fn install(&mut self, next: Vec<Section>) {
        self.document.sections = next;
        self.history.record(self.document.sections.clone());
        self.dirty = true;
        self.document.status = PageStatus::Draft;
        self.gate.edited();

        // Drop selection entries that no longer resolve
        let sections = &self.document.sections;
        self.selected.retain(|id| sections.iter().any(|s| s.id == *id));
    }
}
