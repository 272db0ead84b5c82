//! Incoming HTTP request type.

use bytes::Bytes;
use http::{HeaderMap, Uri};

use crate::error::BadRequest;
use crate::method::Method;

/// An incoming HTTP request with its body fully read.
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    peer: String,
}

impl Request {
    /// Builds a request by hand. The server does this for every inbound
    /// exchange; custom transports and tests can do the same.
    ///
    /// `peer` is the client address as the socket reports it, without port.
    pub fn new(
        method: Method,
        uri: &Uri,
        headers: HeaderMap,
        body: impl Into<Bytes>,
        peer: impl Into<String>,
    ) -> Self {
        Self {
            method,
            path: uri.path().to_owned(),
            query: uri.query().map(str::to_owned),
            headers,
            body: body.into(),
            peer: peer.into(),
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn peer(&self) -> &str { &self.peer }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Reads the GraphQL operation carried by this request.
    ///
    /// GET takes `query`, `variables` (JSON text) and `operationName` from
    /// the URL query string. Every other method reads a JSON body.
    pub fn graphql(&self) -> Result<async_graphql::Request, BadRequest> {
        match self.method {
            Method::Get => async_graphql::http::parse_query_string(self.query().unwrap_or_default())
                .map_err(|e| BadRequest(e.to_string())),
            _ => serde_json::from_slice(&self.body).map_err(|e| BadRequest(e.to_string())),
        }
    }
}
