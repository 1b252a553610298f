//! Product telemetry events.
//!
//! Handlers report through the `Telemetry` trait so tests can record events
//! instead of logging them.

use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TelemetryEvent {
    /// An element was added to the canvas.
    CanvasElementAdded {
        control: String,
        page: String,
        module: String,
        segment: String,
        #[serde(rename = "type")]
        kind: String,
    },
    /// The user acted on an AI answer (`result:insert`, `result:retry`, ...).
    AiResponse { result: String },
}

impl TelemetryEvent {
    /// Canvas-add event for an element created from the AI toolbar.
    #[must_use]
    pub fn ai_element_added(kind: &str) -> Self {
        Self::CanvasElementAdded {
            control: "ai".into(),
            page: "whiteboard editor".into(),
            module: "toolbar".into(),
            segment: "toolbar".into(),
            kind: kind.into(),
        }
    }

    #[must_use]
    pub fn ai_response(result: &str) -> Self {
        Self::AiResponse { result: result.into() }
    }
}

pub trait Telemetry: Send + Sync {
    fn track(&self, event: &TelemetryEvent);
}

/// Emits every event as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn track(&self, event: &TelemetryEvent) {
        match event {
            TelemetryEvent::CanvasElementAdded { control, page, module, segment, kind } => {
                info!(%control, %page, %module, %segment, %kind, "telemetry: canvas element added");
            }
            TelemetryEvent::AiResponse { result } => info!(%result, "telemetry: ai response"),
        }
    }
}
