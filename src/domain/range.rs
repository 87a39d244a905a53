// Date range driving trip, eco-event, and history queries
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Civil date window for detail queries. Owned by the detail coordinator
/// and mutated only by explicit user action; changing it never refetches
/// on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// The default window: the last seven days up to today.
    pub fn last_week() -> Self {
        let to = Local::now().date_naive();
        Self {
            from: to - Duration::days(7),
            to,
        }
    }

    /// Start of the query window: 00:00:00 of the first day.
    pub fn window_start_iso(&self) -> String {
        format!("{}T00:00:00", self.from)
    }

    /// End of the query window: 23:59:59 of the last day.
    pub fn window_end_iso(&self) -> String {
        format!("{}T23:59:59", self.to)
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::last_week()
    }
}
