//! # Live Sync Channels
//!
//! Two independent broadcast channels, deliberately not conflated:
//!
//! - **Preview channel** (editor → embedded preview surface): carries the
//!   full in-memory draft on every relevant edit. A `Live` signal switches
//!   the surface back to fetching the published document.
//! - **Publish notification channel** (server → all viewers): a one-way
//!   "this page changed" broadcast with no content payload; the source of
//!   truth for content is always a subsequent fetch.
//!
//! Both sit on `tokio::broadcast`. Subscribers that lag are dropped onto the
//! `Lagged` path and simply continue from the newest message: staleness is
//! acceptable, serving no page is not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use vitrine_document::PageDocument;

/// Message on the preview channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PreviewMessage {
    /// Render this pushed draft instead of fetching from the server
    Draft {
        slug: String,
        document: PageDocument,
    },

    /// Publish landed; go back to fetching the live document
    Live { slug: String },
}

impl PreviewMessage {
    pub fn slug(&self) -> &str {
        match self {
            PreviewMessage::Draft { slug, .. } => slug,
            PreviewMessage::Live { slug } => slug,
        }
    }
}

/// Publish notification: what changed and when, never the content itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishEvent {
    pub slug: String,
    pub changed_at: DateTime<Utc>,
}

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Broadcast fan-out for both live-sync channels
#[derive(Clone)]
pub struct SyncChannels {
    preview: broadcast::Sender<PreviewMessage>,
    publish: broadcast::Sender<PublishEvent>,
}

impl SyncChannels {
    pub fn new(capacity: usize) -> Self {
        let (preview, _) = broadcast::channel(capacity);
        let (publish, _) = broadcast::channel(capacity);
        Self { preview, publish }
    }

    /// Push the current draft to any open preview surface. Fire-and-forget:
    /// no subscribers is not an error.
    pub fn push_draft(&self, slug: impl Into<String>, document: PageDocument) {
        let _ = self.preview.send(PreviewMessage::Draft {
            slug: slug.into(),
            document,
        });
    }

    /// Tell preview surfaces to switch back to the live document
    pub fn signal_live(&self, slug: impl Into<String>) {
        let _ = self.preview.send(PreviewMessage::Live { slug: slug.into() });
    }

    /// Notify all viewers that a page's published content changed
    pub fn notify_published(&self, slug: impl Into<String>) -> PublishEvent {
        let event = PublishEvent {
            slug: slug.into(),
            changed_at: Utc::now(),
        };
        let _ = self.publish.send(event.clone());
        event
    }

    pub fn subscribe_preview(&self) -> broadcast::Receiver<PreviewMessage> {
        self.preview.subscribe()
    }

    pub fn subscribe_publish(&self) -> broadcast::Receiver<PublishEvent> {
        self.publish.subscribe()
    }

    pub fn preview_subscribers(&self) -> usize {
        self.preview.receiver_count()
    }

    pub fn publish_subscribers(&self) -> usize {
        self.publish.receiver_count()
    }
}

impl Default for SyncChannels {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}
