//! Strips engine diagnostics from outgoing results.

use async_graphql::Response;

/// Returns `response` without its extensions (tracing and other profiling
/// data).
///
/// Takes the result by value: the caller's copy is consumed, so no other
/// request can observe the removal. A result without extensions passes
/// through unchanged, and applying this twice is the same as applying it once.
pub fn sanitize(response: Response) -> Response {
    let mut clean = response;
    clean.extensions.clear();
    clean
}
