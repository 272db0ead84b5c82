//! # gqlveil
//!
//! An interception layer between an HTTP transport and a GraphQL engine.
//! Resolvers and schema stay untouched; around every execution gqlveil
//!
//! - redacts [`DomainError`]s to a fixed public message,
//! - logs the client address, duration, query and variables of each
//!   request (preflight `OPTIONS` excepted),
//! - strips the engine's tracing extensions from the outgoing result.
//!
//! The engine is [async-graphql](async_graphql). A minimal hyper server and
//! router ship alongside so the middleware can be served directly.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema};
//! use gqlveil::{DomainError, GraphqlLog, Router, Server, engine, router::DEFAULT_PATH};
//!
//! struct Query;
//!
//! #[Object]
//! impl Query {
//!     async fn user(&self, id: i32) -> async_graphql::Result<String> {
//!         // The client sees "thrift error"; the code and message go to the log.
//!         Err(DomainError::new(1, format!("no user {id}")).into())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let schema = engine::with_tracing(Schema::build(Query, EmptyMutation, EmptySubscription)).finish();
//!     let app = Router::new().graphql(DEFAULT_PATH, GraphqlLog::new(schema));
//!
//!     Server::bind("[::]:3000").serve(app).await.unwrap();
//! }
//! ```

mod domain_error;
mod error;
mod method;
mod request;
mod response;
mod server;

pub mod address;
pub mod classify;
pub mod engine;
pub mod logger;
pub mod middleware;
pub mod router;
pub mod sanitize;
pub mod timing;

pub use classify::PUBLIC_MESSAGE;
pub use domain_error::DomainError;
pub use engine::Executor;
pub use error::{BadRequest, Error};
pub use logger::{LogRecord, LogSink, TracingSink};
pub use method::Method;
pub use middleware::{ExecutionRequest, GraphqlLog, RequestContext};
pub use request::Request;
pub use response::{Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
