//! Unified error types.

use thiserror::Error;

/// The error type returned by the server's fallible operations.
///
/// GraphQL failures never show up here: they travel to the client inside
/// the result envelope. This type surfaces infrastructure failures: a bad
/// bind address, binding to a port or accepting a connection.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid socket address `{0}`")]
    Address(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// An HTTP request that could not be read as a GraphQL operation.
#[derive(Debug, Error)]
#[error("malformed GraphQL request: {0}")]
pub struct BadRequest(pub String);

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn io_errors_keep_their_source() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken"));
        assert_eq!(err.to_string(), "io: taken");
        assert!(err.source().is_some());
    }

    #[test]
    fn address_error_names_the_input() {
        assert_eq!(Error::Address("x".to_owned()).to_string(), "invalid socket address `x`");
    }
}
