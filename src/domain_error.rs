//! The one error kind this crate rewrites before it reaches a client.

use thiserror::Error;

/// An internal failure raised by resolver logic.
///
/// Everything in here stays server-side. When a resolver returns a
/// `DomainError`, async-graphql keeps it as the *source* of the resulting
/// [`ServerError`](async_graphql::ServerError); the
/// [classifier](crate::classify) recognises it there and replaces the
/// client-visible message with [`PUBLIC_MESSAGE`](crate::PUBLIC_MESSAGE).
///
/// ```rust
/// use gqlveil::DomainError;
///
/// let err = DomainError::new(1, "lookup failed").with_origin("user-service", "getUser");
/// assert_eq!(err.code(), 1);
/// assert_eq!(err.to_string(), "user-service.getUser failed with code 1: lookup failed");
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{full_message}")]
pub struct DomainError {
    code: i64,
    internal_message: String,
    origin_component: Option<String>,
    origin_operation: Option<String>,
    full_message: String,
}

impl DomainError {
    pub fn new(code: i64, internal_message: impl Into<String>) -> Self {
        let internal_message = internal_message.into();
        let full_message = compose(code, &internal_message, None, None);
        Self {
            code,
            internal_message,
            origin_component: None,
            origin_operation: None,
            full_message,
        }
    }

    /// Records which component and operation raised the error.
    pub fn with_origin(self, component: impl Into<String>, operation: impl Into<String>) -> Self {
        let origin_component = component.into();
        let origin_operation = operation.into();
        let full_message = compose(
            self.code,
            &self.internal_message,
            Some(&origin_component),
            Some(&origin_operation),
        );
        Self {
            origin_component: Some(origin_component),
            origin_operation: Some(origin_operation),
            full_message,
            ..self
        }
    }

    pub fn code(&self) -> i64 { self.code }
    pub fn internal_message(&self) -> &str { &self.internal_message }
    pub fn origin_component(&self) -> Option<&str> { self.origin_component.as_deref() }
    pub fn origin_operation(&self) -> Option<&str> { self.origin_operation.as_deref() }
    pub fn full_message(&self) -> &str { &self.full_message }
}

fn compose(code: i64, message: &str, component: Option<&str>, operation: Option<&str>) -> String {
    match (component, operation) {
        (Some(c), Some(o)) => format!("{c}.{o} failed with code {code}: {message}"),
        (Some(c), None) => format!("{c} failed with code {code}: {message}"),
        (None, Some(o)) => format!("{o} failed with code {code}: {message}"),
        (None, None) => format!("code {code}: {message}"),
    }
}
