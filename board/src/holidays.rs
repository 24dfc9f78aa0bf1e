//! Public holiday overlay.
//!
//! Holidays are read-only and never persisted. A failed lookup yields an
//! empty overlay; there is no retry.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

#[async_trait]
pub trait HolidaySource: Send + Sync {
    /// Holidays of a whole year. Never fails; errors produce an empty list.
    async fn holidays(&self, year: i32) -> Vec<Holiday>;
}

/// Lookup against the Nager.Date public holiday API.
#[derive(Debug, Clone)]
pub struct NagerHolidays {
    client: Client,
    base_url: String,
    country: String,
}

impl NagerHolidays {
    pub fn new(base_url: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            country: country.into(),
        }
    }

    async fn fetch(&self, year: i32) -> Result<Vec<Holiday>, reqwest::Error> {
        let url = format!("{}/api/v3/PublicHolidays/{}/{}", self.base_url, year, self.country);
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Holiday>>()
            .await
    }
}

#[async_trait]
impl HolidaySource for NagerHolidays {
    async fn holidays(&self, year: i32) -> Vec<Holiday> {
        match self.fetch(year).await {
            Ok(holidays) => holidays,
            Err(e) => {
                warn!("Failed to fetch holidays for {} ({}): {}", year, self.country, e);
                Vec::new()
            }
        }
    }
}

/// Holidays falling on `date`.
pub fn on_day(holidays: &[Holiday], date: NaiveDate) -> Vec<Holiday> {
    holidays.iter().filter(|h| h.date == date).cloned().collect()
}
