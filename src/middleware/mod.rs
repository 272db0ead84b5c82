//! The GraphQL middleware.
//!
//! [`GraphqlLog`] wraps a single execution-engine call per request:
//!
//! ```text
//! request ──▶ executor.execute ──▶ error hook ──▶ response hook ──▶ result
//!                  (once)          classify()     resolve address
//!                                                 extract duration
//!                                                 log (unless OPTIONS)
//!                                                 sanitize
//! ```
//!
//! Nothing in here is mutable after [`Builder::build`]. One instance serves
//! every request concurrently.

mod context;

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use async_graphql::{Request, Response, ServerError, Variables};
use futures_util::FutureExt;
use http::StatusCode;
use tracing::{Instrument, error, info_span, warn};

use crate::address::ClientAddress;
use crate::classify::classify;
use crate::domain_error::DomainError;
use crate::engine::Executor;
use crate::logger::{self, LogRecord, LogSink, TracingSink};
use crate::method::Method;
use crate::request::Request as HttpRequest;
use crate::response::Response as HttpResponse;
use crate::sanitize::sanitize;
use crate::timing;

pub use context::{ExecutionRequest, RequestContext};

/// Message returned when the engine itself panics.
pub const ENGINE_FAULT_MESSAGE: &str = "internal error";

/// Intercepts GraphQL executions to redact domain errors, log each request
/// and strip tracing data from the result.
///
/// ```rust
/// use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema};
/// use gqlveil::{GraphqlLog, Router, engine};
///
/// struct Query;
///
/// #[Object]
/// impl Query {
///     async fn ping(&self) -> &str { "pong" }
/// }
///
/// let schema = engine::with_tracing(Schema::build(Query, EmptyMutation, EmptySubscription)).finish();
/// let app = Router::new().graphql("/graphql", GraphqlLog::new(schema));
/// ```
pub struct GraphqlLog {
    executor: Box<dyn Executor>,
    sink: Arc<dyn LogSink>,
}

/// Options for [`GraphqlLog`]. The schema is required; the log sink
/// defaults to [`TracingSink`].
pub struct Builder {
    executor: Box<dyn Executor>,
    sink: Option<Arc<dyn LogSink>>,
}

impl Builder {
    /// Sends request records to `sink` instead of the default.
    pub fn log(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn build(self) -> GraphqlLog {
        GraphqlLog {
            executor: self.executor,
            sink: self.sink.unwrap_or_else(|| Arc::new(TracingSink)),
        }
    }
}

impl GraphqlLog {
    pub fn builder(schema: impl Executor) -> Builder {
        Builder { executor: Box::new(schema), sink: None }
    }

    /// Middleware with the default sink.
    pub fn new(schema: impl Executor) -> Self {
        Self::builder(schema).build()
    }

    /// Runs one execution through the engine and both hooks.
    ///
    /// Always yields a result envelope: engine panics come back as an error
    /// list, and faults inside the response hook only cost the log record.
    pub async fn execute(&self, exec: ExecutionRequest) -> Response {
        let query = exec.query().to_owned();
        let variables = exec.variables().clone();
        let method = exec.context().method();
        let peer = exec.context().peer().to_owned();
        let ExecutionRequest { request, context } = exec;

        let span = info_span!("graphql", %method, peer = %peer);
        let response = self.run(request.data(context)).instrument(span.clone()).await;

        span.in_scope(|| {
            let response = format_errors(response);
            self.format_response(response, method, &peer, &query, &variables)
        })
    }

    /// Parses `req` as a GraphQL request, executes it and serializes the
    /// result. This is what [`Router::graphql`](crate::Router::graphql) mounts.
    pub async fn serve(&self, req: HttpRequest) -> HttpResponse {
        let request = match req.graphql() {
            Ok(request) => request,
            Err(e) => {
                warn!(path = req.path(), "{e}");
                return HttpResponse::error_envelope(StatusCode::BAD_REQUEST, &e.to_string());
            }
        };
        let exec = ExecutionRequest::new(request, RequestContext::from(&req));
        HttpResponse::graphql(&self.execute(exec).await)
    }

    async fn run(&self, request: Request) -> Response {
        match AssertUnwindSafe(self.executor.execute(request)).catch_unwind().await {
            Ok(response) => response,
            Err(panic) => {
                error!(reason = panic_reason(&*panic), "execution engine panicked");
                Response::from_errors(vec![ServerError::new(ENGINE_FAULT_MESSAGE, None)])
            }
        }
    }

    /// Response hook: resolve address, read duration, log, sanitize.
    fn format_response(
        &self,
        response: Response,
        method: Method,
        peer: &str,
        query: &str,
        variables: &Variables,
    ) -> Response {
        let duration = timing::duration(&response);
        let record = LogRecord::new(ClientAddress::new(peer), &duration, query, variables);

        let logged = catch_unwind(AssertUnwindSafe(|| {
            logger::emit(self.sink.as_ref(), method, &record);
        }));
        if logged.is_err() {
            warn!(address = %record.address, "log sink panicked, request not logged");
        }

        sanitize(response)
    }
}

/// Error hook: runs every engine error through the classifier. Redacted
/// details stay in the server log.
fn format_errors(response: Response) -> Response {
    let mut formatted = response;
    formatted.errors = std::mem::take(&mut formatted.errors)
        .into_iter()
        .map(|error| {
            if let Some(domain) = error.source::<DomainError>() {
                warn!(
                    code = domain.code(),
                    component = domain.origin_component().unwrap_or("-"),
                    operation = domain.origin_operation().unwrap_or("-"),
                    "redacted: {domain}"
                );
            }
            classify(error)
        })
        .collect();
    formatted
}

fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_graphql::{Pos, Value, value};

    use super::*;
    use crate::classify::PUBLIC_MESSAGE;
    use crate::engine::BoxFuture;
    use crate::logger::tests::Capture;

    /// Engine stub returning a canned response and counting calls.
    struct Canned {
        calls: Arc<AtomicUsize>,
        errors: Vec<ServerError>,
        duration: Option<Value>,
    }

    impl Executor for Canned {
        fn execute(&self, _request: Request) -> BoxFuture<'_, Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut response = Response::new(value!({ "user": { "id": 1 } }));
            response.errors = self.errors.clone();
            if let Some(duration) = &self.duration {
                response
                    .extensions
                    .insert("tracing".to_owned(), value!({ "duration": duration.clone() }));
            }
            Box::pin(async move { response })
        }
    }

    struct Exploding;

    fn explode() -> Response {
        panic!("engine exploded")
    }

    impl Executor for Exploding {
        fn execute(&self, _request: Request) -> BoxFuture<'_, Response> {
            Box::pin(async { explode() })
        }
    }

    struct PanickingSink;

    impl LogSink for PanickingSink {
        fn info(&self, _record: &LogRecord) {
            panic!("sink down");
        }
    }

    fn canned(errors: Vec<ServerError>, duration: Option<Value>) -> (Canned, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Canned { calls: Arc::clone(&calls), errors, duration }, calls)
    }

    fn exec(method: Method) -> ExecutionRequest {
        ExecutionRequest::new(
            Request::new("{ user { id } }"),
            RequestContext::new(method, "::ffff:10.0.0.5"),
        )
    }

    #[tokio::test]
    async fn logs_once_and_sanitizes() {
        let (engine, calls) = canned(vec![], Some(Value::from(2_000_000)));
        let sink = Arc::new(Capture::default());
        let mw = GraphqlLog::builder(engine).log(Arc::clone(&sink)).build();

        let response = mw.execute(exec(Method::Post)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(response.extensions.is_empty());
        assert_eq!(response.data, value!({ "user": { "id": 1 } }));
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].address.resolved(), "10.0.0.5");
        assert_eq!(records[0].address.raw(), "::ffff:10.0.0.5");
        assert_eq!(records[0].duration, "2ms");
        assert_eq!(records[0].query, "{ user { id } }");
        assert_eq!(records[0].variables, "{}");
    }

    #[tokio::test]
    async fn preflight_is_executed_but_not_logged() {
        let (engine, calls) = canned(vec![], Some(Value::from(1)));
        let sink = Arc::new(Capture::default());
        let mw = GraphqlLog::builder(engine).log(Arc::clone(&sink)).build();

        let response = mw.execute(exec(Method::Options)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sink.records().is_empty());
        assert!(response.extensions.is_empty());
    }

    #[tokio::test]
    async fn missing_duration_logs_unknown() {
        let (engine, _) = canned(vec![], None);
        let sink = Arc::new(Capture::default());
        let mw = GraphqlLog::builder(engine).log(Arc::clone(&sink)).build();

        mw.execute(exec(Method::Get)).await;

        assert_eq!(sink.records()[0].duration, timing::UNKNOWN);
    }

    #[tokio::test]
    async fn malformed_duration_still_sanitizes() {
        let (engine, _) = canned(vec![], Some(Value::from("soon")));
        let sink = Arc::new(Capture::default());
        let mw = GraphqlLog::builder(engine).log(Arc::clone(&sink)).build();

        let response = mw.execute(exec(Method::Get)).await;

        assert!(response.extensions.is_empty());
        assert_eq!(sink.records()[0].duration, timing::UNKNOWN);
    }

    #[tokio::test]
    async fn domain_errors_are_redacted_others_kept() {
        let domain = async_graphql::Error::from(DomainError::new(1, "lookup failed"))
            .into_server_error(Pos { line: 1, column: 3 });
        let other = ServerError::new("Unknown field \"nope\"", Some(Pos { line: 1, column: 9 }));
        let (engine, _) = canned(vec![domain, other.clone()], None);
        let mw = GraphqlLog::builder(engine).log(Capture::default()).build();

        let response = mw.execute(exec(Method::Post)).await;

        assert_eq!(response.errors[0].message, PUBLIC_MESSAGE);
        assert_eq!(response.errors[0].locations, vec![Pos { line: 1, column: 3 }]);
        assert_eq!(response.errors[1], other);
    }

    #[tokio::test]
    async fn engine_panic_becomes_error_list() {
        let sink = Arc::new(Capture::default());
        let mw = GraphqlLog::builder(Exploding).log(Arc::clone(&sink)).build();

        let response = mw.execute(exec(Method::Post)).await;

        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].message, ENGINE_FAULT_MESSAGE);
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn sink_panic_does_not_abort_request() {
        let (engine, _) = canned(vec![], Some(Value::from(2_000_000)));
        let mw = GraphqlLog::builder(engine).log(PanickingSink).build();

        let response = mw.execute(exec(Method::Post)).await;

        assert!(response.extensions.is_empty());
        assert_eq!(response.data, value!({ "user": { "id": 1 } }));
    }
}
