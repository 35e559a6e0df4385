//! Incremental decoder for the plan-generation SSE stream.
//!
//! The LLM service emits `data:`-prefixed lines, one JSON event per line.
//! Network chunks split lines at arbitrary byte offsets, so the decoder
//! accumulates bytes in a buffer and only processes complete lines; the
//! trailing partial line waits for the next chunk. The stream is held open
//! for the whole generation, so the shared request timeout does not apply
//! here.

use futures_util::StreamExt as _;
use tokio_util::sync::CancellationToken;
use wayfare_config::Config;
use wayfare_types::traits::{ByteStream, Result};
use wayfare_types::{ApiError, GeneratePlanRequest, StreamEvent, TravelPlan};

/// Observer hooks invoked as stream events arrive. All hooks are optional.
#[derive(Default)]
pub struct StreamCallbacks {
    on_status: Option<Box<dyn Fn(&str, f64) + Send + Sync>>,
    on_progress: Option<Box<dyn Fn(&str, f64) + Send + Sync>>,
    on_chunk: Option<Box<dyn Fn(&str) + Send + Sync>>,
    on_complete: Option<Box<dyn Fn(&TravelPlan, bool) + Send + Sync>>,
    on_error: Option<Box<dyn Fn(&str) + Send + Sync>>,
}

impl StreamCallbacks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoked for `status` events with the message and overall progress.
    #[must_use]
    pub fn on_status(mut self, f: impl Fn(&str, f64) + Send + Sync + 'static) -> Self {
        self.on_status = Some(Box::new(f));
        self
    }

    /// Invoked for `progress` events with the message and overall progress.
    #[must_use]
    pub fn on_progress(mut self, f: impl Fn(&str, f64) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Invoked for each `chunk` event with the incremental plan text.
    #[must_use]
    pub fn on_chunk(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_chunk = Some(Box::new(f));
        self
    }

    /// Invoked once when a `complete` event delivers the final plan. The
    /// flag is `true` when the server satisfied the request from cache.
    #[must_use]
    pub fn on_complete(mut self, f: impl Fn(&TravelPlan, bool) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Invoked with a display message when generation fails.
    #[must_use]
    pub fn on_error(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    fn emit_error(&self, message: &str) {
        if let Some(f) = &self.on_error {
            f(message);
        }
    }
}

/// Client for the streamed plan-generation endpoint on the LLM service.
///
/// Deliberately built without a request timeout: generation can run for
/// minutes and the connection stays open throughout.
pub struct PlanStreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl PlanStreamClient {
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Runs a generation to completion, dispatching callbacks along the way,
    /// and returns the final plan.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::StreamTerminated`] if the server reports failure,
    /// [`ApiError::StreamProtocol`] if the stream ends without delivering a
    /// plan, or a transport error if the connection drops.
    pub async fn generate(
        &self,
        request: &GeneratePlanRequest,
        callbacks: &StreamCallbacks,
    ) -> Result<TravelPlan> {
        self.generate_with_cancel(request, callbacks, &CancellationToken::new())
            .await
    }

    /// Like [`Self::generate`] but abortable through `cancel`. On
    /// cancellation the connection is dropped and [`ApiError::Cancelled`]
    /// is returned without invoking any callback.
    ///
    /// # Errors
    ///
    /// See [`Self::generate`].
    pub async fn generate_with_cancel(
        &self,
        request: &GeneratePlanRequest,
        callbacks: &StreamCallbacks,
        cancel: &CancellationToken,
    ) -> Result<TravelPlan> {
        let mut body = request.clone();
        body.budget = Some(body.budget.unwrap_or_default());

        let response = self
            .http
            .post(format!("{}/api/v1/plans/generate/stream", self.base_url))
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .inspect_err(|e| {
                tracing::warn!(error = %e, "generation request failed to connect");
                callbacks.emit_error("Network error - please check your connection");
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = format!("generation request rejected with status {status}");
            tracing::warn!(%status, "generation request rejected");
            callbacks.emit_error(&message);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let stream: ByteStream = Box::pin(response.bytes_stream().map(|r| r.map_err(Into::into)));
        decode_stream(stream, callbacks, cancel).await
    }
}

/// Drives the byte stream to a terminal condition, dispatching one callback
/// per decoded event.
pub async fn decode_stream(
    mut stream: ByteStream,
    callbacks: &StreamCallbacks,
    cancel: &CancellationToken,
) -> Result<TravelPlan> {
    let mut buffer = String::new();
    let mut final_plan: Option<TravelPlan> = None;

    loop {
        let chunk = tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!("generation stream cancelled by caller");
                return Err(ApiError::Cancelled);
            }
            chunk = stream.next() => chunk,
        };

        let Some(chunk) = chunk else {
            // End of stream without a done event; a retained plan still counts.
            return final_plan
                .ok_or_else(|| ApiError::StreamProtocol("stream ended unexpectedly".to_string()));
        };
        let chunk = chunk.inspect_err(|e| {
            tracing::warn!(error = %e, "generation stream transport failure");
            callbacks.emit_error(&e.user_message());
        })?;

        buffer.push_str(&String::from_utf8_lossy(&chunk));

        // Only complete lines are decoded; the tail stays buffered.
        while let Some(pos) = buffer.find('\n') {
            let line: String = buffer.drain(..=pos).collect();
            match handle_line(line.trim_end_matches(['\r', '\n']), callbacks, &mut final_plan)? {
                LineOutcome::Continue => {}
                LineOutcome::Finished => {
                    return final_plan.ok_or_else(|| {
                        ApiError::StreamProtocol("stream completed without final plan".to_string())
                    });
                }
            }
        }
    }
}

enum LineOutcome {
    Continue,
    Finished,
}

fn handle_line(
    line: &str,
    callbacks: &StreamCallbacks,
    final_plan: &mut Option<TravelPlan>,
) -> Result<LineOutcome> {
    let Some(payload) = line.strip_prefix("data: ") else {
        // Blank keep-alive lines and non-data fields (comments, ids).
        return Ok(LineOutcome::Continue);
    };
    if payload.trim().is_empty() {
        return Ok(LineOutcome::Continue);
    }

    let event: StreamEvent = match serde_json::from_str(payload) {
        Ok(event) => event,
        Err(e) => {
            // One bad frame must not kill the stream.
            tracing::warn!(error = %e, "skipping malformed stream frame");
            return Ok(LineOutcome::Continue);
        }
    };

    match event {
        StreamEvent::Status { message, progress } => {
            if let Some(f) = &callbacks.on_status {
                f(&message, progress);
            }
        }
        StreamEvent::Progress { message, progress } => {
            if let Some(f) = &callbacks.on_progress {
                f(&message, progress);
            }
        }
        StreamEvent::Chunk { content } => {
            if let Some(f) = &callbacks.on_chunk {
                f(&content);
            }
        }
        StreamEvent::Complete { plan, cached } => {
            if let Some(plan) = plan {
                if let Some(f) = &callbacks.on_complete {
                    f(&plan, cached);
                }
                *final_plan = Some(plan);
            } else {
                tracing::warn!("complete event arrived without a plan payload");
            }
        }
        StreamEvent::Error { message, error } => {
            let message = message
                .or(error)
                .unwrap_or_else(|| "Unknown error".to_string());
            callbacks.emit_error(&message);
            return Err(ApiError::StreamTerminated(message));
        }
        StreamEvent::Done => return Ok(LineOutcome::Finished),
        StreamEvent::Unknown => {
            tracing::debug!("ignoring unrecognized stream event type");
        }
    }
    Ok(LineOutcome::Continue)
}
