//! The execution-engine seam.
//!
//! The middleware never resolves a query itself. It hands an
//! [`async_graphql::Request`] to an [`Executor`] and post-processes whatever
//! comes back. Every `async_graphql::Schema` is an executor; tests plug in
//! their own.

use std::future::Future;
use std::pin::Pin;

use async_graphql::extensions::ApolloTracing;
use async_graphql::{ObjectType, Request, Response, Schema, SchemaBuilder, SubscriptionType};

/// A heap-allocated, type-erased future, `Send` so tokio can move it across
/// worker threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Runs one GraphQL request to completion.
pub trait Executor: Send + Sync + 'static {
    fn execute(&self, request: Request) -> BoxFuture<'_, Response>;
}

impl<Q, M, S> Executor for Schema<Q, M, S>
where
    Q: ObjectType + 'static,
    M: ObjectType + 'static,
    S: SubscriptionType + 'static,
{
    fn execute(&self, request: Request) -> BoxFuture<'_, Response> {
        Box::pin(Schema::execute(self, request))
    }
}

/// Turns on per-request tracing, which is where the logged duration comes
/// from. Without it every request logs an `unknown` duration.
///
/// ```rust
/// use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema};
///
/// struct Query;
///
/// #[Object]
/// impl Query {
///     async fn ping(&self) -> &str { "pong" }
/// }
///
/// let schema = gqlveil::engine::with_tracing(
///     Schema::build(Query, EmptyMutation, EmptySubscription),
/// )
/// .finish();
/// ```
pub fn with_tracing<Q, M, S>(builder: SchemaBuilder<Q, M, S>) -> SchemaBuilder<Q, M, S>
where
    Q: ObjectType + 'static,
    M: ObjectType + 'static,
    S: SubscriptionType + 'static,
{
    builder.extension(ApolloTracing)
}
