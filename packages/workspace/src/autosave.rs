//! # Debounced Auto-save
//!
//! Edits mark the draft dirty; after a quiet period with no further edits the
//! driver persists the *latest* local state. Intermediate states are
//! deliberately dropped (last-write-wins): the watch channel holds only the
//! newest sections, so whatever is current at fire time is what gets saved.
//! An explicit flush bypasses the quiet period.
//!
//! Interleaving guarantee with undo: an undo that lands before the timer
//! fires replaces the channel value like any other edit, so the save that
//! eventually fires persists the post-undo state. A save already in flight
//! may persist a superseded snapshot, but the session stays marked dirty and
//! the next cycle saves the final state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use vitrine_document::Section;
use vitrine_editor::SaveState;

use crate::store::PageStore;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_secs(2);

/// Handle to a spawned auto-save driver for one page
pub struct Autosave {
    latest: watch::Sender<Option<Vec<Section>>>,
    flush: mpsc::Sender<()>,
    status: watch::Receiver<SaveState>,
    task: JoinHandle<()>,
}

impl Autosave {
    /// Spawn the driver task. It runs until the handle is dropped.
    pub fn spawn(store: Arc<dyn PageStore>, slug: impl Into<String>, quiet: Duration) -> Self {
        let slug = slug.into();
        let (latest_tx, latest_rx) = watch::channel(None);
        let (flush_tx, flush_rx) = mpsc::channel(1);
        let (status_tx, status_rx) = watch::channel(SaveState::Saved);

        let task = tokio::spawn(run_driver(store, slug, quiet, latest_rx, flush_rx, status_tx));

        Self {
            latest: latest_tx,
            flush: flush_tx,
            status: status_rx,
            task,
        }
    }

    /// Record the newest draft state. Replaces any pending snapshot; issuing
    /// this never blocks local editing.
    pub fn mark_dirty(&self, sections: Vec<Section>) {
        let _ = self.latest.send(Some(sections));
    }

    /// Explicit user save: skip the remaining quiet period
    pub fn flush(&self) {
        let _ = self.flush.try_send(());
    }

    pub fn save_state(&self) -> SaveState {
        *self.status.borrow()
    }

    /// Status feed for the host chrome (saved | saving | dirty | error)
    pub fn subscribe_status(&self) -> watch::Receiver<SaveState> {
        self.status.clone()
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_driver(
    store: Arc<dyn PageStore>,
    slug: String,
    quiet: Duration,
    mut latest: watch::Receiver<Option<Vec<Section>>>,
    mut flush: mpsc::Receiver<()>,
    status: watch::Sender<SaveState>,
) {
    loop {
        // Wait for the first dirty mark of a cycle; an explicit flush skips
        // the quiet period entirely
        let mut flush_now = false;
        tokio::select! {
            changed = latest.changed() => {
                if changed.is_err() {
                    return;
                }
            }
            _ = flush.recv() => {
                flush_now = true;
            }
        }
        let _ = status.send(SaveState::Dirty);

        // Quiet period: every further edit restarts it, flush cuts it short
        while !flush_now {
            tokio::select! {
                _ = tokio::time::sleep(quiet) => break,
                changed = latest.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = flush.recv() => break,
            }
        }

        let snapshot = latest.borrow_and_update().clone();
        let Some(sections) = snapshot else {
            continue;
        };

        let _ = status.send(SaveState::Saving);
        match store.save_draft(&slug, sections).await {
            Ok(_) => {
                debug!(slug, "auto-saved draft");
                // Edits that raced the save keep the state dirty; the next
                // cycle persists them.
                let next = if latest.has_changed().unwrap_or(false) {
                    SaveState::Dirty
                } else {
                    SaveState::Saved
                };
                let _ = status.send(next);
            }
            Err(error) => {
                warn!(slug, %error, "auto-save failed; local state preserved");
                let _ = status.send(SaveState::Error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use vitrine_document::Section;

    // Wait for the status to transition into `target`. Subscribers are set up
    // before the first dirty mark, so no transition can be missed.
    async fn wait_for(rx: &mut watch::Receiver<SaveState>, target: SaveState) {
        loop {
            rx.changed().await.unwrap();
            if *rx.borrow() == target {
                return;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_period_saves_latest_state() {
        let store = Arc::new(MemoryStore::new());
        let autosave = Autosave::spawn(store.clone(), "home", Duration::from_secs(2));
        let mut status = autosave.subscribe_status();

        // Three rapid edits; only the last should be persisted
        autosave.mark_dirty(vec![Section::new("s-1", "hero")]);
        autosave.mark_dirty(vec![Section::new("s-1", "hero"), Section::new("s-2", "footer")]);
        autosave.mark_dirty(vec![Section::new("s-3", "gallery")]);

        wait_for(&mut status, SaveState::Saved).await;

        let saved = store.load("home").await.unwrap();
        assert_eq!(saved.sections.len(), 1);
        assert_eq!(saved.sections[0].section_type, "gallery");
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_bypasses_debounce() {
        let store = Arc::new(MemoryStore::new());
        let autosave = Autosave::spawn(store.clone(), "home", Duration::from_secs(3600));
        let mut status = autosave.subscribe_status();

        autosave.mark_dirty(vec![Section::new("s-1", "hero")]);
        autosave.flush();

        // With an hour-long quiet period only the flush can get us here
        wait_for(&mut status, SaveState::Saved).await;
        assert_eq!(store.load("home").await.unwrap().sections.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_undo_before_fire_persists_post_undo_state() {
        let store = Arc::new(MemoryStore::new());
        let autosave = Autosave::spawn(store.clone(), "home", Duration::from_secs(2));
        let mut status = autosave.subscribe_status();

        // Edit adds a section...
        autosave.mark_dirty(vec![Section::new("s-1", "hero"), Section::new("s-2", "footer")]);
        // ...then an undo lands before the debounce fires
        autosave.mark_dirty(vec![Section::new("s-1", "hero")]);

        wait_for(&mut status, SaveState::Saved).await;

        // The save that fired used fire-time-latest state, not the
        // superseded intermediate
        let saved = store.load("home").await.unwrap();
        assert_eq!(saved.sections.len(), 1);
        assert_eq!(saved.sections[0].section_type, "hero");
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_failure_reports_error_and_keeps_state() {
        struct FailingStore;

        #[async_trait::async_trait]
        impl PageStore for FailingStore {
            async fn load(&self, slug: &str) -> Result<vitrine_document::PageDocument, crate::store::StoreError> {
                Err(crate::store::StoreError::NotFound(slug.to_string()))
            }
            async fn save_draft(
                &self,
                _slug: &str,
                _sections: Vec<Section>,
            ) -> Result<vitrine_document::PageDocument, crate::store::StoreError> {
                Err(crate::store::StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "network down",
                )))
            }
            async fn publish(&self, slug: &str) -> Result<vitrine_document::Version, crate::store::StoreError> {
                Err(crate::store::StoreError::NotFound(slug.to_string()))
            }
            async fn rollback(&self, slug: &str, _version_index: u32) -> Result<vitrine_document::Version, crate::store::StoreError> {
                Err(crate::store::StoreError::NotFound(slug.to_string()))
            }
            async fn export_template(&self, slug: &str) -> Result<Vec<u8>, crate::store::StoreError> {
                Err(crate::store::StoreError::NotFound(slug.to_string()))
            }
            async fn import_template(
                &self,
                _bytes: &[u8],
                slug: &str,
                _overwrite: bool,
            ) -> Result<vitrine_document::PageDocument, crate::store::StoreError> {
                Err(crate::store::StoreError::NotFound(slug.to_string()))
            }
            async fn list_pages(&self) -> Result<Vec<String>, crate::store::StoreError> {
                Ok(Vec::new())
            }
        }

        let autosave = Autosave::spawn(Arc::new(FailingStore), "home", Duration::from_millis(10));
        let mut status = autosave.subscribe_status();

        autosave.mark_dirty(vec![Section::new("s-1", "hero")]);
        wait_for(&mut status, SaveState::Error).await;
    }
}
