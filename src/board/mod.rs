pub mod arrivals;
pub mod calendar;
pub mod snapshot;
pub mod station;
