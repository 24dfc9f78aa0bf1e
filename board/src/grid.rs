//! Month grid layout: whole weeks, Sunday through Saturday.

use chrono::{Datelike, Days, NaiveDate};
use shared::{day_key, MonthRange, Task};

use crate::holidays::{self, Holiday};
use crate::search;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridDay {
    pub date: NaiveDate,
    /// `YYYY-MM-DD`, also the drag group id of the cell
    pub key: String,
    pub in_month: bool,
    pub holidays: Vec<Holiday>,
    pub tasks: Vec<Task>,
}

/// Every date shown for `month`, from the Sunday on or before the first to
/// the Saturday on or after the last.
pub fn month_days(month: MonthRange) -> Vec<NaiveDate> {
    let lead = u64::from(month.first.weekday().num_days_from_sunday());
    let trail = 6 - u64::from(month.last.weekday().num_days_from_sunday());
    let start = month.first.checked_sub_days(Days::new(lead)).unwrap_or(month.first);
    let end = month.last.checked_add_days(Days::new(trail)).unwrap_or(month.last);
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Lay out the month with holidays and search-filtered tasks in each cell.
pub fn build_grid(month: MonthRange, tasks: &[Task], holidays: &[Holiday], term: &str) -> Vec<GridDay> {
    let visible = search::filter_tasks(tasks, term);
    month_days(month)
        .into_iter()
        .map(|date| {
            let mut day_tasks: Vec<Task> = visible.iter().filter(|t| t.date == date).map(|t| (*t).clone()).collect();
            day_tasks.sort_by_key(|t| t.order);
            GridDay {
                date,
                key: day_key(date),
                in_month: month.contains(date),
                holidays: holidays::on_day(holidays, date),
                tasks: day_tasks,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc, Weekday};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_days_cover_whole_weeks() {
        // May 2024 starts on a Wednesday and ends on a Friday.
        let days = month_days(MonthRange::new(2024, 5).unwrap());
        assert_eq!(days.first(), Some(&date(2024, 4, 28)));
        assert_eq!(days.last(), Some(&date(2024, 6, 1)));
        assert_eq!(days.len() % 7, 0);
        assert_eq!(days[0].weekday(), Weekday::Sun);
    }

    #[test]
    fn test_month_starting_on_sunday_has_no_lead() {
        // September 2024 starts on a Sunday.
        let days = month_days(MonthRange::new(2024, 9).unwrap());
        assert_eq!(days[0], date(2024, 9, 1));
    }

    #[test]
    fn test_build_grid_places_tasks_and_holidays() {
        let month = MonthRange::new(2024, 5).unwrap();
        let make = |content: &str, order: i32| Task {
            id: Uuid::new_v4(),
            calendar_id: Uuid::nil(),
            date: date(2024, 5, 3),
            content: content.to_string(),
            order,
            tags: vec![],
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let tasks = vec![make("second", 1), make("first", 0)];
        let holidays = vec![Holiday {
            date: date(2024, 5, 3),
            name: "Constitution Day".to_string(),
        }];

        let grid = build_grid(month, &tasks, &holidays, "");
        let cell = grid.iter().find(|d| d.key == "2024-05-03").unwrap();
        assert!(cell.in_month);
        assert_eq!(cell.holidays.len(), 1);
        let contents: Vec<&str> = cell.tasks.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);

        assert!(!grid[0].in_month);

        let filtered = build_grid(month, &tasks, &holidays, "SEC");
        let cell = filtered.iter().find(|d| d.key == "2024-05-03").unwrap();
        assert_eq!(cell.tasks.len(), 1);
    }
}
