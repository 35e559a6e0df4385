//! Discriminated event union for the plan-generation SSE protocol.
//!
//! One event is decoded per `data:` frame and immediately dispatched; events
//! are never retained by the decoder beyond the pending final plan.

use crate::models::TravelPlan;
use serde::Deserialize;

/// One decoded frame from the generation stream, discriminated by `type`.
///
/// `error` and `done` are terminal: no further events are processed after
/// either of them. An unrecognized `type` value decodes to [`Self::Unknown`]
/// instead of failing, so new server-side event kinds degrade gracefully.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Status {
        #[serde(default)]
        message: String,
        #[serde(default)]
        progress: f64,
    },
    Progress {
        #[serde(default)]
        message: String,
        #[serde(default)]
        progress: f64,
    },
    Chunk {
        #[serde(default)]
        content: String,
    },
    Complete {
        #[serde(default)]
        plan: Option<TravelPlan>,
        #[serde(default)]
        cached: bool,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        error: Option<String>,
    },
    Done,
    /// Unrecognized `type` value; skipped by the decoder.
    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    /// Returns `true` for events after which the stream must not be read
    /// further.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::Done)
    }
}
