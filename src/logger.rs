//! Per-request log record and the sinks it is written to.

use std::fmt;
use std::sync::Arc;

use async_graphql::Variables;
use tracing::info;

use crate::address::ClientAddress;
use crate::method::Method;

const QUERY_BANNER: &str = "============query=======";
const VARIABLES_BANNER: &str = "============variables=======";

/// One line of request log: who asked, how long it took, and what was asked.
///
/// Renders as
///
/// ```text
/// 10.0.0.5 2ms
/// ============query=======
/// { user(id: 1) { name } }
/// ============variables=======
/// {}
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// Peer address; the record shows its resolved form.
    pub address: ClientAddress,
    pub duration: String,
    pub query: String,
    /// Variables as JSON text.
    pub variables: String,
}

impl LogRecord {
    pub fn new(address: ClientAddress, duration: &str, query: &str, variables: &Variables) -> Self {
        let variables =
            serde_json::to_string(variables).unwrap_or_else(|e| format!("<unserializable: {e}>"));
        Self {
            address,
            duration: duration.to_owned(),
            query: query.to_owned(),
            variables,
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}\n{QUERY_BANNER}\n{}\n{VARIABLES_BANNER}\n{}",
            self.address, self.duration, self.query, self.variables,
        )
    }
}

/// Destination for request records.
pub trait LogSink: Send + Sync {
    fn info(&self, record: &LogRecord);
}

impl<L: LogSink + ?Sized> LogSink for Arc<L> {
    fn info(&self, record: &LogRecord) {
        (**self).info(record)
    }
}

/// Default sink: one `tracing` event per record at `INFO`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, record: &LogRecord) {
        info!(
            target: "gqlveil::request",
            address = %record.address,
            peer = record.address.raw(),
            duration = %record.duration,
            "{record}"
        );
    }
}

/// Writes `record` to `sink` unless `method` is a preflight.
pub fn emit(sink: &dyn LogSink, method: Method, record: &LogRecord) {
    if method.is_preflight() {
        return;
    }
    sink.info(record);
}
