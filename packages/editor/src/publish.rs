//! # Publish State Machine
//!
//! Client-side gate for the draft → publishing → published transition.
//!
//! Publishing is a single request from the client's point of view: while one
//! is in flight no second publish may start, a failure returns cleanly to
//! `Draft` with no partial version, and success lands in `Published` until
//! the next edit dirties the draft again. The authoritative version append
//! happens in the persistence service; this gate only tracks what the client
//! may do next.

use serde::{Deserialize, Serialize};

use crate::errors::EditorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishState {
    Draft,
    Publishing,
    Published,
}

#[derive(Debug)]
pub struct PublishGate {
    state: PublishState,
}

impl PublishGate {
    pub fn new() -> Self {
        Self {
            state: PublishState::Draft,
        }
    }

    pub fn state(&self) -> PublishState {
        self.state
    }

    /// Enter `Publishing`. Fails if a publish is already in flight.
    pub fn begin(&mut self) -> Result<(), EditorError> {
        if self.state == PublishState::Publishing {
            return Err(EditorError::PublishInFlight);
        }
        self.state = PublishState::Publishing;
        Ok(())
    }

    /// The request succeeded; the live pointer now serves the new version.
    pub fn complete(&mut self) {
        self.state = PublishState::Published;
    }

    /// The request failed; nothing was applied, the draft is untouched.
    pub fn fail(&mut self) {
        self.state = PublishState::Draft;
    }

    /// A new edit landed; published content stays live but the working copy
    /// is a draft again.
    pub fn edited(&mut self) {
        if self.state == PublishState::Published {
            self.state = PublishState::Draft;
        }
    }
}

impl Default for PublishGate {
    fn default() -> Self {
        Self::new()
    }
}
