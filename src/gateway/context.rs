//! Per-call state.
//!
//! # Call States
//! ```text
//! Idle → AwaitingBody → BodyParsed → Encoded → UpstreamPending
//!     → UpstreamTransportFailed | UpstreamBadStatus | UpstreamBadContentType
//!       | UpstreamDecodeFailed | UpstreamOk
//!     → ResponseSent
//! ```
//! Client-side failures jump straight to `ResponseSent` from the phase they
//! occur in. No transition ever goes backwards.

use std::time::Instant;

use axum::http::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Idle,
    AwaitingBody,
    BodyParsed,
    Encoded,
    UpstreamPending,
    UpstreamTransportFailed,
    UpstreamBadStatus,
    UpstreamBadContentType,
    UpstreamDecodeFailed,
    UpstreamOk,
    ResponseSent,
}

impl CallPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallPhase::Idle => "idle",
            CallPhase::AwaitingBody => "awaiting_body",
            CallPhase::BodyParsed => "body_parsed",
            CallPhase::Encoded => "encoded",
            CallPhase::UpstreamPending => "upstream_pending",
            CallPhase::UpstreamTransportFailed => "upstream_transport_failed",
            CallPhase::UpstreamBadStatus => "upstream_bad_status",
            CallPhase::UpstreamBadContentType => "upstream_bad_content_type",
            CallPhase::UpstreamDecodeFailed => "upstream_decode_failed",
            CallPhase::UpstreamOk => "upstream_ok",
            CallPhase::ResponseSent => "response_sent",
        }
    }

    /// Whether `next` is a legal successor of this phase.
    pub fn can_advance_to(&self, next: CallPhase) -> bool {
        use CallPhase::*;
        match (self, next) {
            (ResponseSent, _) => false,
            (_, ResponseSent) => true,
            (Idle, AwaitingBody) => true,
            (AwaitingBody, BodyParsed) => true,
            (BodyParsed, Encoded) => true,
            (Encoded, UpstreamPending) => true,
            (
                UpstreamPending,
                UpstreamTransportFailed
                | UpstreamBadStatus
                | UpstreamBadContentType
                | UpstreamDecodeFailed
                | UpstreamOk,
            ) => true,
            _ => false,
        }
    }
}

/// Transient state owned by one call; dropped once the response is built.
#[derive(Debug)]
pub struct RequestContext {
    request_id: String,
    endpoint: String,
    resolved: bool,
    started: Instant,
    phase: CallPhase,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            endpoint: endpoint.into(),
            resolved: false,
            started: Instant::now(),
            phase: CallPhase::Idle,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn phase(&self) -> CallPhase {
        self.phase
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn mark_resolved(&mut self) {
        self.resolved = true;
    }

    /// Endpoint label for metrics; unknown names collapse into one series.
    pub fn metric_label(&self) -> &str {
        if self.resolved {
            &self.endpoint
        } else {
            "unknown"
        }
    }

    pub fn advance(&mut self, next: CallPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal call transition {:?} -> {:?}",
            self.phase,
            next
        );
        tracing::trace!(
            request_id = %self.request_id,
            endpoint = %self.endpoint,
            from = self.phase.as_str(),
            to = next.as_str(),
            "Call phase"
        );
        self.phase = next;
    }

    /// Record the terminal transition.
    pub fn finish(&mut self, status: StatusCode) {
        let last = self.phase;
        self.advance(CallPhase::ResponseSent);
        tracing::debug!(
            request_id = %self.request_id,
            endpoint = %self.endpoint,
            status = status.as_u16(),
            last_phase = last.as_str(),
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Call finished"
        );
    }
}
