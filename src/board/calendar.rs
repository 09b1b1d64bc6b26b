use chrono::{Datelike, NaiveDate, Weekday};

use crate::board::snapshot::Snapshot;
use crate::gtfs::structs::ExceptionType;

impl Snapshot {
    /// Whether `service_id` operates on `date`.
    ///
    /// An exception row for exactly (service, date) wins outright over the
    /// weekly pattern and the date range. A service id absent from the
    /// calendar is treated as not running, never as an error. The caller
    /// supplies "today"; this is a pure function of its arguments.
    pub fn service_runs_on(&self, service_id: &str, date: NaiveDate) -> bool {
        if let Some(exception) = self.calendar_dates.get(&(service_id.to_owned(), date)) {
            return *exception == ExceptionType::Added;
        }
        let Some(entry) = self.calendar.get(service_id) else {
            return false;
        };
        if date < entry.start_date || date > entry.end_date {
            return false;
        }
        match date.weekday() {
            Weekday::Mon => entry.monday,
            Weekday::Tue => entry.tuesday,
            Weekday::Wed => entry.wednesday,
            Weekday::Thu => entry.thursday,
            Weekday::Fri => entry.friday,
            Weekday::Sat => entry.saturday,
            Weekday::Sun => entry.sunday,
        }
    }
}
