//! Calendar handlers.

use std::sync::Arc;

use lambda_http::{Body, Error, Request, Response};
use serde::Deserialize;
use shared::http::{error_response, json_response, store_error_response};
use shared::parse_body;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::request::{non_empty, query_param, route};
use crate::AppState;

/// Create calendar request
#[derive(Debug, Deserialize, Validate)]
struct CreateCalendarRequest {
    #[validate(required, length(min = 1))]
    name: Option<String>,
}

pub async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let (method, path) = route(&event);
    info!("Calendar request: {} {}", method, path);

    match (method.as_str(), path.as_str()) {
        ("POST", "/calendar") => {
            let request: CreateCalendarRequest = parse_body!(event.body());
            if request.validate().is_err() {
                return error_response(400, "Calendar name is required");
            }
            let name = request.name.unwrap_or_default();

            match state.store.create_calendar(&name).await {
                Ok(calendar) => {
                    info!("Created calendar {} ({})", calendar.id, calendar.name);
                    json_response(201, &calendar)
                }
                Err(e) => store_error_response(&e, "Failed to create calendar"),
            }
        }

        ("GET", "/calendar") => {
            let id = match non_empty(query_param(&event, "id")) {
                Some(raw) => match Uuid::parse_str(&raw) {
                    Ok(id) => Some(id),
                    Err(_) => return error_response(400, "Invalid calendar ID"),
                },
                None => None,
            };

            match state.store.get_calendar(id).await {
                Ok(Some(calendar)) => json_response(200, &calendar),
                Ok(None) => error_response(404, "Calendar not found"),
                Err(e) => store_error_response(&e, "Failed to fetch calendar"),
            }
        }

        (_, "/calendar") => error_response(405, "Method not allowed"),

        _ => error_response(404, "Not found"),
    }
}
