//! Request duration out of the engine's tracing diagnostics.
//!
//! With [`ApolloTracing`](async_graphql::extensions::ApolloTracing) installed
//! the engine attaches `extensions.tracing.duration`, measured in
//! nanoseconds. Anything missing or malformed along that path is a
//! [`FormattingFault`]: it is logged and the duration reads [`UNKNOWN`].

use async_graphql::{Response, Value};
use thiserror::Error;
use tracing::warn;

/// Extension key under which the engine publishes its tracing data.
pub const TRACING_KEY: &str = "tracing";

/// Field of the tracing object holding the total duration.
pub const DURATION_FIELD: &str = "duration";

/// Nanoseconds per millisecond.
pub const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Sentinel duration when the diagnostics don't carry one.
pub const UNKNOWN: &str = "unknown";

/// Why a duration could not be read from the diagnostics.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FormattingFault {
    #[error("diagnostics carry no `{0}` entry")]
    Missing(&'static str),
    #[error("diagnostics entry `{0}` has an unexpected shape")]
    Malformed(&'static str),
}

/// Reads the duration, in milliseconds, from a `tracing` diagnostics value.
pub fn try_duration_ms(tracing: Option<&Value>) -> Result<f64, FormattingFault> {
    let Value::Object(fields) = tracing.ok_or(FormattingFault::Missing(TRACING_KEY))? else {
        return Err(FormattingFault::Malformed(TRACING_KEY));
    };
    match fields.get(DURATION_FIELD) {
        None => Err(FormattingFault::Missing(DURATION_FIELD)),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(|nanos| nanos / NANOS_PER_MILLI)
            .ok_or(FormattingFault::Malformed(DURATION_FIELD)),
        Some(_) => Err(FormattingFault::Malformed(DURATION_FIELD)),
    }
}

/// Formats the response's duration for display, e.g. `"2ms"`.
///
/// Never fails: faults are logged and yield [`UNKNOWN`].
pub fn duration(response: &Response) -> String {
    match try_duration_ms(response.extensions.get(TRACING_KEY)) {
        Ok(ms) => format!("{ms}ms"),
        Err(fault) => {
            warn!(%fault, "request duration unavailable");
            UNKNOWN.to_owned()
        }
    }
}
