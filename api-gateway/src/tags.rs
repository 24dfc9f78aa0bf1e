//! Tag handlers.

use std::sync::Arc;

use lambda_http::{Body, Error, Request, Response};
use serde::Deserialize;
use shared::http::{error_response, json_response, store_error_response};
use shared::parse_body;
use tracing::info;
use validator::Validate;

use crate::request::route;
use crate::AppState;

/// Create tag request
#[derive(Debug, Deserialize, Validate)]
struct CreateTagRequest {
    #[validate(required, length(min = 1))]
    name: Option<String>,
    #[validate(required, length(min = 1))]
    color: Option<String>,
}

pub async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let (method, path) = route(&event);
    info!("Tags request: {} {}", method, path);

    match (method.as_str(), path.as_str()) {
        ("GET", "/tags") => match state.store.list_tags().await {
            Ok(tags) => json_response(200, &tags),
            Err(e) => store_error_response(&e, "Failed to fetch tags"),
        },

        ("POST", "/tags") => {
            let request: CreateTagRequest = parse_body!(event.body());
            if request.validate().is_err() {
                return error_response(400, "Tag name and color are required");
            }
            let name = request.name.unwrap_or_default();
            let color = request.color.unwrap_or_default();

            match state.store.create_tag(&name, &color).await {
                Ok(tag) => {
                    info!("Created tag {} ({})", tag.name, tag.id);
                    json_response(201, &tag)
                }
                Err(e) => store_error_response(&e, "Failed to create tag"),
            }
        }

        (_, "/tags") => error_response(405, "Method not allowed"),

        _ => error_response(404, "Not found"),
    }
}
