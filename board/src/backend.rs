//! Access to the REST API.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::{Calendar, MonthRange, Tag, Task};
use tracing::debug;
use uuid::Uuid;

use crate::error::{BoardError, Result};

/// Body of `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub date: NaiveDate,
    pub content: String,
    pub calendar_id: Uuid,
    pub order: i32,
    pub tag_ids: Vec<Uuid>,
}

/// Body of `PUT /tasks/{id}`; `None` fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<Uuid>>,
}

impl UpdateTask {
    pub fn order(order: i32) -> Self {
        Self {
            order: Some(order),
            ..Default::default()
        }
    }

    pub fn relocate(date: NaiveDate, order: i32) -> Self {
        Self {
            date: Some(date),
            order: Some(order),
            ..Default::default()
        }
    }

    pub fn edit(content: String, tag_ids: Vec<Uuid>) -> Self {
        Self {
            content: Some(content),
            tag_ids: Some(tag_ids),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait BoardBackend: Send + Sync {
    async fn create_calendar(&self, name: &str) -> Result<Calendar>;
    async fn get_calendar(&self, id: Uuid) -> Result<Option<Calendar>>;
    async fn list_tags(&self) -> Result<Vec<Tag>>;
    async fn list_tasks(&self, calendar_id: Uuid, month: MonthRange) -> Result<Vec<Task>>;
    async fn create_task(&self, task: &CreateTask) -> Result<Task>;
    async fn update_task(&self, id: Uuid, update: &UpdateTask) -> Result<Task>;
    async fn delete_task(&self, id: Uuid) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// [`BoardBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// `base_url` includes the `/api` prefix, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or(text);
    Err(BoardError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    Ok(check(response).await?.json::<T>().await?)
}

#[async_trait]
impl BoardBackend for HttpBackend {
    async fn create_calendar(&self, name: &str) -> Result<Calendar> {
        let response = self
            .client
            .post(self.url("/calendar"))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        decode(response).await
    }

    async fn get_calendar(&self, id: Uuid) -> Result<Option<Calendar>> {
        let response = self
            .client
            .get(self.url("/calendar"))
            .query(&[("id", id.to_string())])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(response).await.map(Some)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let response = self.client.get(self.url("/tags")).send().await?;
        decode(response).await
    }

    async fn list_tasks(&self, calendar_id: Uuid, month: MonthRange) -> Result<Vec<Task>> {
        debug!("Fetching tasks for {}-{:02}", month.year(), month.month());
        let response = self
            .client
            .get(self.url("/tasks"))
            .query(&[
                ("year", month.year().to_string()),
                ("month", format!("{:02}", month.month())),
                ("calendarId", calendar_id.to_string()),
            ])
            .send()
            .await?;
        decode(response).await
    }

    async fn create_task(&self, task: &CreateTask) -> Result<Task> {
        let response = self.client.post(self.url("/tasks")).json(task).send().await?;
        decode(response).await
    }

    async fn update_task(&self, id: Uuid, update: &UpdateTask) -> Result<Task> {
        let response = self
            .client
            .put(self.url(&format!("/tasks/{}", id)))
            .json(update)
            .send()
            .await?;
        decode(response).await
    }

    async fn delete_task(&self, id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/tasks/{}", id)))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
