//! Shared data models.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A named container owning a set of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A named, coloured label attachable to many tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

/// A dated, tagged, orderable text item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub calendar_id: Uuid,
    pub date: NaiveDate,
    pub content: String,
    pub order: i32,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Ids of the attached tags, in display order.
    pub fn tag_ids(&self) -> Vec<Uuid> {
        self.tags.iter().map(|t| t.id).collect()
    }
}

/// Fields for a task about to be inserted.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub calendar_id: Uuid,
    pub date: NaiveDate,
    pub content: String,
    pub order: i32,
    pub tag_ids: Vec<Uuid>,
}

/// Partial update of a task. `None` leaves the field untouched;
/// `tag_ids: Some(..)` replaces the whole tag set.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub date: Option<NaiveDate>,
    pub content: Option<String>,
    pub order: Option<i32>,
    pub tag_ids: Option<Vec<Uuid>>,
}

/// First and last day (inclusive) of a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl MonthRange {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::Validation(format!("Invalid month: {}-{}", year, month)))?;
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| Error::Validation(format!("Month out of range: {}-{}", year, month)))?;
        Ok(Self { first, last })
    }

    /// Month containing the given date.
    pub fn containing(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first);
        Self { first, last }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }
}

/// Parse a task date from either `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_task_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.date_naive())
        .map_err(|_| Error::Validation(format!("Invalid date: {}", input)))
}

/// The `YYYY-MM-DD` key tasks are grouped under.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_range_bounds() {
        let feb = MonthRange::new(2024, 2).unwrap();
        assert_eq!(feb.first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let dec = MonthRange::new(2023, 12).unwrap();
        assert_eq!(dec.last, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_month_range_rejects_bad_month() {
        assert!(MonthRange::new(2024, 0).is_err());
        assert!(MonthRange::new(2024, 13).is_err());
    }

    #[test]
    fn test_month_range_contains_is_inclusive() {
        let range = MonthRange::new(2024, 4).unwrap();
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
    }

    #[test]
    fn test_month_range_containing() {
        let range = MonthRange::containing(NaiveDate::from_ymd_opt(2025, 1, 17).unwrap());
        assert_eq!(range, MonthRange::new(2025, 1).unwrap());
    }

    #[test]
    fn test_parse_task_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(parse_task_date("2024-06-03").unwrap(), expected);
        assert_eq!(parse_task_date("2024-06-03T10:15:00Z").unwrap(), expected);
        assert!(parse_task_date("03/06/2024").is_err());
    }

    #[test]
    fn test_task_json_shape() {
        let task = Task {
            id: Uuid::nil(),
            calendar_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            content: "Buy milk".to_string(),
            order: 2,
            tags: vec![],
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["date"], "2024-06-03");
        assert_eq!(value["calendarId"], Uuid::nil().to_string());
        assert_eq!(value["order"], 2);
        assert!(value.get("updatedAt").is_some());
    }
}
