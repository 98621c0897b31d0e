use tracing::{Level, Span};

use super::TraceId;

/// Root span for one adapter call that may fan out into several round trips.
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::span!(
        Level::INFO,
        "root",
        op = name,
        trace_id = %trace_id.as_str()
    )
}

/// Child span for a single round trip. Inherits trace_id from the parent.
pub fn child_span(name: &'static str, key: &str) -> Span {
    tracing::span!(Level::DEBUG, "child", op = name, key = %key)
}
