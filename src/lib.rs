//! Loader and query engine for GTFS-static transit feeds.
//!
//! A feed zip is parsed into typed tables ([`gtfs`]), folded into an
//! immutable, indexed [`board::snapshot::Snapshot`], and queried for lines,
//! stations and upcoming arrivals.

pub mod board;
pub mod gtfs;
