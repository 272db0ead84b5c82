//! What the middleware knows about the inbound HTTP exchange.

use http::HeaderMap;

use crate::method::Method;
use crate::request::Request as HttpRequest;

/// The inbound request as resolvers see it.
///
/// Installed in the GraphQL context of every execution, so a resolver can
/// read the caller's headers or address:
///
/// ```rust,ignore
/// async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<String> {
///     let req = ctx.data::<RequestContext>()?;
///     Ok(req.header("x-user").unwrap_or("anonymous").to_owned())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct RequestContext {
    method: Method,
    path: String,
    headers: HeaderMap,
    peer: String,
}

impl RequestContext {
    pub fn new(method: Method, peer: impl Into<String>) -> Self {
        Self { method, path: String::new(), headers: HeaderMap::new(), peer: peer.into() }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    /// Raw peer address string, before any resolution.
    pub fn peer(&self) -> &str { &self.peer }

    /// Header value, if present and valid UTF-8. Lookup is case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl From<&HttpRequest> for RequestContext {
    fn from(req: &HttpRequest) -> Self {
        Self::new(req.method(), req.peer())
            .with_path(req.path())
            .with_headers(req.headers().clone())
    }
}

/// One GraphQL execution: the parsed operation plus the exchange it came in on.
pub struct ExecutionRequest {
    pub(crate) request: async_graphql::Request,
    pub(crate) context: RequestContext,
}

impl ExecutionRequest {
    pub fn new(request: impl Into<async_graphql::Request>, context: RequestContext) -> Self {
        Self { request: request.into(), context }
    }

    pub fn query(&self) -> &str { &self.request.query }
    pub fn variables(&self) -> &async_graphql::Variables { &self.request.variables }
    pub fn context(&self) -> &RequestContext { &self.context }
}
