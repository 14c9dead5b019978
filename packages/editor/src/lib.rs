//! # Vitrine Editor
//!
//! Core document editing engine for Vitrine pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: sections + settings + versions    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditorSession owns document truth   │
//! │  - Mutation API (infallible, no-op on miss) │
//! │  - Snapshot history with undo/redo          │
//! │  - Draft → Publishing → Published gate      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ renderer: sections → render tree            │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Sections are the source of truth**: render output and history
//!    snapshots are derived views.
//! 2. **Mutations never fail**: operating on a missing ID is a defined no-op,
//!    because edits race with concurrent deletions (a section deleted
//!    mid-drag must not error the drop).
//! 3. **Every mutation yields a new sequence**: the session replaces document
//!    state and feeds the snapshot through history; UI layers are observers,
//!    never owners.
//! 4. **Batch operations are one history step**: bulk delete/hide must not
//!    flood the undo stack.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vitrine_editor::{EditorSession, Mutation};
//!
//! let mut session = EditorSession::start_fresh("home", defaults);
//!
//! session.apply(&Mutation::AddSection {
//!     section_type: "hero".to_string(),
//!     at_end: true,
//! });
//!
//! session.undo();
//! session.redo();
//! ```

mod errors;
mod history;
mod mutations;
mod publish;
mod session;

pub use errors::EditorError;
pub use history::{History, Snapshot, DEFAULT_HISTORY_DEPTH};
pub use mutations::{copy, Clipboard, ClipboardBlock, ClipboardEntry, Mutation, Placement};
pub use publish::{PublishGate, PublishState};
pub use session::{EditorSession, SaveState};

// Re-export the model types the host UI needs alongside the session
pub use vitrine_document::{Block, PageDocument, PageStatus, Section, Settings};
