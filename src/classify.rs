//! Error-formatting hook: redacts [`DomainError`]s.

use async_graphql::ServerError;

use crate::domain_error::DomainError;

/// The only message a client ever sees for a [`DomainError`].
pub const PUBLIC_MESSAGE: &str = "thrift error";

/// Rewrites the message of an error whose source is a [`DomainError`].
///
/// Locations, path and extensions are kept as they are. Any other error,
/// including one with no source at all, comes back untouched.
pub fn classify(error: ServerError) -> ServerError {
    if error.source::<DomainError>().is_none() {
        return error;
    }
    let mut redacted = error;
    redacted.message = PUBLIC_MESSAGE.to_owned();
    redacted
}

#[cfg(test)]
mod tests {
    use async_graphql::{Error, Pos};
    use rstest::rstest;

    use super::*;

    fn domain(code: i64, message: &str) -> ServerError {
        Error::from(DomainError::new(code, message).with_origin("svc", "op"))
            .into_server_error(Pos { line: 3, column: 5 })
    }

    #[rstest]
    #[case(1, "lookup failed")]
    #[case(-42, "")]
    #[case(i64::MAX, "db password is hunter2")]
    fn domain_errors_are_redacted(#[case] code: i64, #[case] message: &str) {
        let out = classify(domain(code, message));
        assert_eq!(out.message, PUBLIC_MESSAGE);
        assert_eq!(out.locations, vec![Pos { line: 3, column: 5 }]);
        assert!(out.source::<DomainError>().is_some());
    }

    #[test]
    fn redacted_error_exposes_no_code() {
        let json = serde_json::to_value(classify(domain(1, "lookup failed"))).unwrap();
        assert_eq!(json["message"], PUBLIC_MESSAGE);
        assert!(json.get("code").is_none());
        assert!(!json.to_string().contains("lookup failed"));
    }

    #[test]
    fn foreign_source_is_identity() {
        let err = Error::from("boom".to_owned()).into_server_error(Pos { line: 1, column: 1 });
        let out = classify(err.clone());
        assert_eq!(out, err);
    }

    #[test]
    fn sourceless_error_is_identity() {
        let err = ServerError::new("Unknown field \"nope\"", Some(Pos { line: 1, column: 3 }));
        assert_eq!(classify(err.clone()), err);
    }
}
