//! # Vitrine Renderer
//!
//! Turns an untrusted, possibly malformed page document into a render tree
//! without ever letting one section take the page down.
//!
//! ## Isolation Contract
//!
//! **INVARIANT: one corrupt section never blanks the page.**
//!
//! For every section the dispatcher produces exactly one of:
//!
//! - a rendered node (known type, settings readable),
//! - an error node naming the type and failure reason (known type, renderer
//!   failed on malformed settings),
//! - a neutral placeholder (unknown type; new types roll out in the editor
//!   before renderers catch up, so this is not an error),
//! - nothing (section is hidden; skipped before dispatch).
//!
//! Renderer failures are `Result` values folded per section, never panics
//! propagating across section boundaries. A render is synchronous and
//! idempotent; there are no retries because nothing changes until the
//! underlying settings do.
//!
//! ## Settings Discipline
//!
//! Renderers read the untyped settings bag through typed accessors: a missing
//! key takes the renderer's documented default and never fails; a present key
//! of the wrong shape is a renderer failure, isolated at the section boundary.

mod context;
mod dispatch;
mod error;
mod output;
mod registry;
mod renderers;
pub mod settings;

pub use context::{CatalogProvider, EmptyCatalog, RenderContext, RenderMode};
pub use dispatch::{render_document, render_section, render_sections};
pub use error::RenderError;
pub use output::{RenderNode, RenderedPage};
pub use registry::{RendererRegistry, SectionRenderer};
