//! gqlveil demo: a `user` resolver that always fails with a domain error.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -X POST http://localhost:3000/graphql \
//!        -H 'content-type: application/json' \
//!        -d '{"query":"{ user(id: 1) { id name } }"}'
//!   curl 'http://localhost:3000/graphql?query=%7B%20user(id%3A%201)%20%7B%20name%20%7D%20%7D'
//!   curl -i -X OPTIONS http://localhost:3000/graphql
//!
//! Every response carries `"message": "thrift error"`; the server log holds
//! the code and internal message.

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema, SimpleObject};
use gqlveil::{DomainError, GraphqlLog, RequestContext, Router, Server, engine, router::DEFAULT_PATH};

#[derive(SimpleObject)]
struct User {
    id: i32,
    name: String,
}

struct Query;

#[Object]
impl Query {
    async fn user(&self, ctx: &Context<'_>, id: Option<i32>) -> async_graphql::Result<Option<User>> {
        let caller = ctx.data::<RequestContext>()?;
        tracing::debug!(peer = caller.peer(), ?id, "looking up user");
        Err(DomainError::new(1, "lookup failed")
            .with_origin("user-service", "getUser")
            .into())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let schema = engine::with_tracing(Schema::build(Query, EmptyMutation, EmptySubscription)).finish();
    let app = Router::new().graphql(DEFAULT_PATH, GraphqlLog::new(schema));

    Server::bind("[::]:3000")
        .serve(app)
        .await
        .expect("server error");
}
