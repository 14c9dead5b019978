//! # Vitrine Workspace
//!
//! The async shell around the synchronous editing core: page persistence,
//! debounced auto-save, the two live-sync channels, and the HTTP/SSE server
//! that the editor UI and storefront talk to.

pub mod autosave;
pub mod server;
pub mod store;
pub mod sync;
pub mod watcher;

pub use autosave::{Autosave, DEFAULT_QUIET_PERIOD};
pub use server::{router, AppState, ServerError};
pub use store::{FileStore, MemoryStore, PageStore, PageTemplate, StoreError};
pub use sync::{PreviewMessage, PublishEvent, SyncChannels};
pub use watcher::{spawn_store_watcher, StoreWatcher};
