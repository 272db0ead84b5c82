//! Outgoing HTTP response type.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use tracing::{error, warn};

const JSON: &str = "application/json";

/// An outgoing HTTP response.
///
/// ```rust
/// use gqlveil::Response;
/// use http::StatusCode;
///
/// Response::json(br#"{"data":null}"#.to_vec());
/// Response::status(StatusCode::NO_CONTENT);
///
/// Response::builder()
///     .status(StatusCode::METHOD_NOT_ALLOWED)
///     .header("allow", "GET, POST")
///     .no_body();
/// ```
pub struct Response {
    body: Bytes,
    headers: Vec<(String, String)>,
    status: StatusCode,
}

impl Response {
    /// `200 OK`, `application/json`.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::builder().finish(JSON, body.into())
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self { body: Bytes::new(), headers: Vec::new(), status: code }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: StatusCode::OK }
    }

    /// `200 OK` carrying a serialized GraphQL result. Errors live inside the
    /// envelope, so the status stays 200 whatever the error list holds.
    ///
    /// Headers set by resolvers (`ctx.insert_http_header`) are copied over;
    /// values that are not valid UTF-8 are dropped.
    pub fn graphql(result: &async_graphql::Response) -> Self {
        let body = match serde_json::to_vec(result) {
            Ok(body) => body,
            Err(e) => {
                error!("failed to serialize GraphQL result: {e}");
                return Self::status(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };
        let mut builder = Self::builder();
        for (name, value) in &result.http_headers {
            match value.to_str() {
                Ok(value) => builder = builder.header(name.as_str(), value),
                Err(_) => warn!(header = %name, "dropping non-UTF-8 header set by resolver"),
            }
        }
        builder.finish(JSON, Bytes::from(body))
    }

    /// `{"errors":[{"message": ...}]}` with the given status.
    pub(crate) fn error_envelope(status: StatusCode, message: &str) -> Self {
        let body = serde_json::json!({ "errors": [{ "message": message }] });
        Self::builder().status(status).finish(JSON, Bytes::from(body.to_string()))
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Converts into the hyper response written to the wire.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder.body(Full::new(self.body)).unwrap_or_else(|e| {
            error!("invalid response header: {e}");
            let mut fallback = http::Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`]. Defaults to `200 OK`.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with no body (e.g. `204 No Content`).
    pub fn no_body(self) -> Response {
        Response { body: Bytes::new(), headers: self.headers, status: self.status }
    }

    fn finish(self, content_type: &str, body: Bytes) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}
