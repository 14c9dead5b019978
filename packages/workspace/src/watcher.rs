use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use thiserror::Error;
use tracing::debug;

use crate::sync::SyncChannels;

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Failed to create watcher: {0}")]
    CreateError(#[from] notify::Error),
}

pub type WatcherResult<T> = Result<T, WatcherError>;

/// Filesystem watcher over the page store directory
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<Event>>,
}

impl StoreWatcher {
    pub fn new(path: PathBuf) -> WatcherResult<Self> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    pub fn next_event(&self) -> Option<Event> {
        match self.receiver.recv() {
            Ok(Ok(event)) => Some(event),
            _ => None,
        }
    }

    pub fn try_next_event(&self) -> Option<Event> {
        match self.receiver.try_recv() {
            Ok(Ok(event)) => Some(event),
            _ => None,
        }
    }
}

/// Watch the page store for out-of-band writes (deploy syncs, manual edits)
/// and broadcast change notifications so viewers refetch. The notification
/// carries only which page changed; content comes from the next fetch.
pub fn spawn_store_watcher(
    root: PathBuf,
    channels: SyncChannels,
) -> WatcherResult<tokio::task::JoinHandle<()>> {
    let watcher = StoreWatcher::new(root)?;

    let handle = tokio::task::spawn_blocking(move || {
        while let Some(event) = watcher.next_event() {
            if !matches!(
                event.kind,
                notify::EventKind::Create(_) | notify::EventKind::Modify(_)
            ) {
                continue;
            }

            for path in &event.paths {
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                if let Some(slug) = path.file_stem().and_then(|s| s.to_str()) {
                    debug!(slug, "page store changed on disk");
                    channels.notify_published(slug);
                }
            }
        }
    });

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_store_watcher_sees_page_writes() {
        let temp_dir = std::env::temp_dir().join("vitrine_watcher_test");
        fs::create_dir_all(&temp_dir).unwrap();

        let watcher = StoreWatcher::new(temp_dir.clone()).unwrap();

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            fs::write(temp_dir.join("home.json"), "{}").unwrap();
        });

        let event = watcher.next_event();
        assert!(event.is_some());
    }
}
