//! Task Lambda - Handles /tasks endpoints, including the month query.

use std::sync::Arc;

use api_gateway::{init_tracing, tasks, AppState};
use lambda_http::{run, service_fn, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let state = Arc::new(AppState::from_env().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { tasks::handler(state, event).await }
    }))
    .await
}
