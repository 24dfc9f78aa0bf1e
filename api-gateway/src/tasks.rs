//! Task handlers, including the month-range query.

use std::sync::Arc;

use lambda_http::{Body, Error, Request, Response};
use serde::Deserialize;
use shared::http::{error_response, json_response, store_error_response};
use shared::{parse_body, parse_task_date, MonthRange, NewTask, TaskPatch};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::request::{non_empty, path_id, query_param, route};
use crate::AppState;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateTaskRequest {
    #[validate(required, length(min = 1))]
    date: Option<String>,
    #[validate(required, length(min = 1))]
    content: Option<String>,
    #[validate(required)]
    calendar_id: Option<Uuid>,
    order: Option<i32>,
    tag_ids: Option<Vec<Uuid>>,
}

/// Update task request; absent fields are left untouched
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTaskRequest {
    date: Option<String>,
    content: Option<String>,
    order: Option<i32>,
    tag_ids: Option<Vec<Uuid>>,
}

/// Parsed `year`/`month`/`calendarId` query.
fn month_query(event: &Request) -> Option<(Uuid, MonthRange)> {
    let year = non_empty(query_param(event, "year"))?.parse::<i32>().ok()?;
    let month = non_empty(query_param(event, "month"))?.parse::<u32>().ok()?;
    let calendar_id = Uuid::parse_str(&non_empty(query_param(event, "calendarId"))?).ok()?;
    let range = MonthRange::new(year, month).ok()?;
    Some((calendar_id, range))
}

pub async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let (method, path) = route(&event);
    info!("Tasks request: {} {}", method, path);

    match (method.as_str(), path.as_str()) {
        // List a month of tasks
        ("GET", "/tasks") => {
            let Some((calendar_id, range)) = month_query(&event) else {
                return error_response(400, "Year, month, and calendarId are required");
            };

            match state.store.list_tasks(calendar_id, range).await {
                Ok(tasks) => json_response(200, &tasks),
                Err(e) => store_error_response(&e, "Failed to fetch tasks"),
            }
        }

        // Create task
        ("POST", "/tasks") => {
            let request: CreateTaskRequest = parse_body!(event.body());
            if request.validate().is_err() {
                return error_response(400, "Date, content, and calendarId are required");
            }
            let date = match parse_task_date(request.date.as_deref().unwrap_or_default()) {
                Ok(date) => date,
                Err(e) => return store_error_response(&e, "Failed to create task"),
            };
            let Some(calendar_id) = request.calendar_id else {
                return error_response(400, "Date, content, and calendarId are required");
            };

            let new_task = NewTask {
                calendar_id,
                date,
                content: request.content.unwrap_or_default(),
                order: request.order.unwrap_or(0),
                tag_ids: request.tag_ids.unwrap_or_default(),
            };

            match state.store.create_task(new_task).await {
                Ok(task) => {
                    info!("Created task {} on {}", task.id, task.date);
                    json_response(201, &task)
                }
                Err(e) => store_error_response(&e, "Failed to create task"),
            }
        }

        (_, "/tasks") => error_response(405, "Method not allowed"),

        _ if path.starts_with("/tasks/") => {
            let task_id = match path_id(&path, "/tasks/") {
                Some(Ok(id)) => id,
                Some(Err(_)) => return error_response(400, "Invalid task ID"),
                None => return error_response(404, "Not found"),
            };

            match method.as_str() {
                // Update task
                "PUT" => {
                    let request: UpdateTaskRequest = parse_body!(event.body());
                    let date = match request.date.as_deref().map(parse_task_date).transpose() {
                        Ok(date) => date,
                        Err(e) => return store_error_response(&e, "Failed to update task"),
                    };
                    let patch = TaskPatch {
                        date,
                        content: request.content,
                        order: request.order,
                        tag_ids: request.tag_ids,
                    };

                    match state.store.update_task(task_id, patch).await {
                        Ok(task) => {
                            info!("Updated task {}", task.id);
                            json_response(200, &task)
                        }
                        Err(e) => store_error_response(&e, "Failed to update task"),
                    }
                }

                // Delete task
                "DELETE" => match state.store.delete_task(task_id).await {
                    Ok(()) => {
                        info!("Deleted task {}", task_id);
                        json_response(200, &serde_json::json!({"message": "Task deleted successfully"}))
                    }
                    Err(e) => store_error_response(&e, "Failed to delete task"),
                },

                _ => error_response(405, "Method not allowed"),
            }
        }

        _ => error_response(404, "Not found"),
    }
}
