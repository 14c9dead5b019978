//! # Snapshot History
//!
//! Bounded undo/redo stack over full section snapshots.
//!
//! ## Design
//!
//! - Each entry is a complete copy of the section list, not a diff. Documents
//!   are small (tens of sections), so whole snapshots trade memory for
//!   simplicity and eliminate patch-conflict bugs.
//! - A cursor points at the active entry; `record` after undos truncates the
//!   redone future before appending.
//! - The stack is capped; the oldest entry is evicted ring-buffer style, never
//!   reported as an error.
//! - Restores triggered by undo/redo must not re-enter `record`, or an undo
//!   would be immediately re-recorded by its own side effect. The session arms
//!   a single-shot latch via `begin_restore`; the next `record` call clears it
//!   and does nothing.

use vitrine_document::Section;

/// A full copy of a document's sections at a point in time
pub type Snapshot = Vec<Section>;

pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// Snapshot-based undo/redo stack
#[derive(Debug)]
pub struct History {
    /// Snapshots in chronological order
    entries: Vec<Snapshot>,

    /// Index of the currently active entry
    cursor: usize,

    /// Maximum number of entries (0 = unlimited)
    max_depth: usize,

    /// Single-shot suppression latch armed by undo/redo restores
    ignore_next_record: bool,
}

impl History {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_HISTORY_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            max_depth,
            ignore_next_record: false,
        }
    }

    /// Clear history to a single entry. Used when a document is freshly
    /// loaded, so server-fetched state is never itself an undoable past.
    pub fn reset(&mut self, initial: Snapshot) {
        self.entries = vec![initial];
        self.cursor = 0;
        self.ignore_next_record = false;
    }

    /// Record a new snapshot as the active entry.
    ///
    /// If prior undos occurred, everything after the cursor is discarded
    /// first (a new edit makes the redone future unreachable). Exceeding the
    /// cap evicts from the front and shifts the cursor.
    pub fn record(&mut self, snapshot: Snapshot) {
        if self.ignore_next_record {
            self.ignore_next_record = false;
            return;
        }

        if self.entries.is_empty() {
            self.entries.push(snapshot);
            self.cursor = 0;
            return;
        }

        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor += 1;

        if self.max_depth > 0 && self.entries.len() > self.max_depth {
            self.entries.remove(0);
            self.cursor -= 1;
        }
    }

    /// Step back one entry; `None` when already at the oldest snapshot
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one entry; `None` when already at the newest snapshot
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// Arm the suppression latch: the very next `record` call is ignored.
    /// Cleared by that call, so mutation-originated records resume normally.
    pub fn begin_restore(&mut self) {
        self.ignore_next_record = true;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of snapshots currently held
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
