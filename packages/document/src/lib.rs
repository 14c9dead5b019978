//! # Vitrine Document Model
//!
//! Typed representation of one storefront page: an ordered list of sections,
//! each carrying an untyped settings bag and optional sub-blocks.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Edit → Publish → Render
//!   ↓      ↓       ↓         ↓
//! JSON  Sections  Version  Nodes
//! ```
//!
//! ## Core Principles
//!
//! 1. **Section order is render order**: the `sections` vec is the single
//!    source of truth for ordering; there is no z-index or priority field.
//! 2. **Settings are schemaless here**: the model only requires a
//!    JSON-serializable map; per-type validation belongs to the renderer
//!    registry.
//! 3. **Versions are append-only**: rollback republishes old content as a new
//!    version, it never rewrites history.
//! 4. **IDs are never reused**: the sequential generator only counts up
//!    within a document lifetime, so deleted section IDs stay retired.

pub mod defaults;
pub mod id;
pub mod model;
pub mod version;

pub use defaults::{EmptyDefaults, SectionDefaults};
pub use id::{page_seed, IdGenerator};
pub use model::{Block, PageDocument, PageStatus, Section, Settings};
pub use version::{append_version, next_version_index, Version};
