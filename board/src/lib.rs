//! Client side of the task board.
//!
//! The [`BoardController`] holds the tasks of the visible month and applies
//! drag-and-drop moves optimistically through the pure functions in
//! [`reducer`], persisting them through a [`BoardBackend`]. Holidays come
//! from a [`HolidaySource`] and are only ever overlaid, never stored.

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod grid;
pub mod holidays;
pub mod reducer;
pub mod search;
pub mod session;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{BoardBackend, CreateTask, HttpBackend, UpdateTask};
pub use config::BoardConfig;
pub use controller::{BoardController, MoveOutcome};
pub use error::{BoardError, Result};
pub use grid::GridDay;
pub use holidays::{Holiday, HolidaySource, NagerHolidays};
pub use reducer::{BoardSnapshot, DragMove, DropLocation, PersistPlan};
pub use session::{Session, SessionFile};
pub use views::{DayCell, Intent, TaskCard};
