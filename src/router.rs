//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Preflight and
//! wrong-method requests are answered here, before the middleware runs.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use matchit::Router as MatchitRouter;

use crate::method::Method;
use crate::middleware::GraphqlLog;
use crate::request::Request;
use crate::response::Response;

/// Where the GraphQL endpoint is usually mounted.
pub const DEFAULT_PATH: &str = "/graphql";

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Arc<GraphqlLog>>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Mounts `middleware` for GET and POST at `path`. Returns `self` for
    /// chaining, so several endpoints can share one router.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or is already mounted.
    pub fn graphql(self, path: &str, middleware: GraphqlLog) -> Self {
        let middleware = Arc::new(middleware);
        self.mount(Method::Get, path, Arc::clone(&middleware))
            .mount(Method::Post, path, middleware)
    }

    fn mount(mut self, method: Method, path: &str, middleware: Arc<GraphqlLog>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, middleware)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Routes one request and produces one response.
    ///
    /// - mounted method and path: the middleware's response
    /// - `OPTIONS` on a known path: `204` with `allow`
    /// - other method on a known path: `405` with `allow`
    /// - unknown path: `404`
    pub async fn dispatch(&self, req: Request) -> Response {
        if let Some(middleware) = self.lookup(req.method(), req.path()) {
            return middleware.serve(req).await;
        }

        let Some(allow) = self.allow(req.path()) else {
            return Response::status(StatusCode::NOT_FOUND);
        };
        let status = if req.method().is_preflight() {
            StatusCode::NO_CONTENT
        } else {
            StatusCode::METHOD_NOT_ALLOWED
        };
        Response::builder().status(status).header("allow", &allow).no_body()
    }

    fn lookup(&self, method: Method, path: &str) -> Option<Arc<GraphqlLog>> {
        let matched = self.routes.get(&method)?.at(path).ok()?;
        Some(Arc::clone(matched.value))
    }

    /// `allow` header value for `path`, or `None` when no method serves it.
    fn allow(&self, path: &str) -> Option<String> {
        let served: Vec<Method> = Method::ALL
            .into_iter()
            .filter(|m| self.routes.get(m).is_some_and(|tree| tree.at(path).is_ok()))
            .collect();
        if served.is_empty() {
            return None;
        }
        let allow = Method::ALL
            .into_iter()
            .filter(|m| m.is_preflight() || served.contains(m))
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Some(allow)
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
