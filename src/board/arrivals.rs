use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

use crate::board::snapshot::Snapshot;
use crate::board::station::{Direction, Station};
use crate::gtfs::structs::Route;
use crate::gtfs::time::ServiceTime;

/// Hard cap on the number of arrivals a single query may return.
pub const MAX_ARRIVALS: usize = 15;

/// One upcoming arrival at a station platform.
///
/// `arrival_time` and `departure_time` carry the raw feed value: a
/// post-midnight arrival stays `25:10:00`, not `01:10:00`. The mod-24
/// normalization is applied only when comparing against "now".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrival {
    /// Route id of the serving line.
    pub line: String,
    pub trip_id: String,
    pub arrival_time: ServiceTime,
    pub departure_time: ServiceTime,
    pub stop_sequence: u32,
}

/// The soonest arrival in each direction at one station.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectionalBoard {
    pub north: Option<Arrival>,
    pub south: Option<Arrival>,
}

impl Snapshot {
    /// All lines in the feed, ordered by route id.
    pub fn list_lines(&self) -> Vec<&Route> {
        let mut routes: Vec<&Route> = self.routes.values().collect();
        routes.sort_by(|a, b| a.route_id.cmp(&b.route_id));
        routes
    }

    /// Stations served by a line, ordered by station id. Unknown line yields
    /// an empty list.
    pub fn stations_for_line(&self, line_id: &str) -> Vec<&Station> {
        match self.line_stations.get(line_id) {
            Some(anchors) => anchors
                .iter()
                .filter_map(|anchor| self.stations.get(anchor))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn get_station(&self, station_id: &str) -> Option<&Station> {
        self.stations.get(station_id)
    }

    /// The next arrivals at a station, strictly after `now`'s time of day.
    ///
    /// With a `direction`, candidates come from that directional platform;
    /// a station without that platform yields an empty list. Without one,
    /// stop_times are matched against the station's anchor id exactly.
    /// Results are filtered by the service calendar for `now`'s date, sorted
    /// by normalized arrival time (stable for ties) and truncated to
    /// `limit`, itself capped at [`MAX_ARRIVALS`].
    pub fn upcoming_arrivals(
        &self,
        station_id: &str,
        direction: Option<Direction>,
        line: Option<&str>,
        limit: usize,
        now: NaiveDateTime,
    ) -> Vec<Arrival> {
        let Some(station) = self.stations.get(station_id) else {
            return Vec::new();
        };
        let target = match direction {
            Some(direction) => match station.directions.get(direction) {
                Some(platform) => platform,
                None => return Vec::new(),
            },
            None => station.id.as_str(),
        };
        let mut arrivals = self.candidate_arrivals(target, line, now);
        arrivals.sort_by_key(|a| a.arrival_time.normalized_seconds());
        arrivals.truncate(limit.min(MAX_ARRIVALS));
        arrivals
    }

    /// The soonest upcoming arrival per direction.
    ///
    /// Stations with directional platforms are queried per platform. Where
    /// the feed never split the station, direction is approximated from the
    /// stop sequence: candidates above the midpoint of the observed sequence
    /// range count as southbound, the rest as northbound. A heuristic, not a
    /// guarantee.
    pub fn next_train_per_direction(
        &self,
        station_id: &str,
        now: NaiveDateTime,
    ) -> DirectionalBoard {
        let mut board = DirectionalBoard::default();
        let Some(station) = self.stations.get(station_id) else {
            return board;
        };

        if station.directions.north.is_some() || station.directions.south.is_some() {
            for direction in [Direction::North, Direction::South] {
                let Some(platform) = station.directions.get(direction) else {
                    continue;
                };
                let mut arrivals = self.candidate_arrivals(platform, None, now);
                arrivals.sort_by_key(|a| a.arrival_time.normalized_seconds());
                let soonest = arrivals.into_iter().next();
                match direction {
                    Direction::North => board.north = soonest,
                    Direction::South => board.south = soonest,
                }
            }
            return board;
        }

        let mut arrivals = self.candidate_arrivals(station.id.as_str(), None, now);
        if arrivals.is_empty() {
            return board;
        }
        arrivals.sort_by_key(|a| a.arrival_time.normalized_seconds());
        let (min, max) = arrivals.iter().fold((u32::MAX, 0), |(min, max), a| {
            (min.min(a.stop_sequence), max.max(a.stop_sequence))
        });
        let midpoint = min + (max - min) / 2;
        for arrival in arrivals {
            if arrival.stop_sequence > midpoint {
                if board.south.is_none() {
                    board.south = Some(arrival);
                }
            } else if board.north.is_none() {
                board.north = Some(arrival);
            }
            if board.north.is_some() && board.south.is_some() {
                break;
            }
        }
        board
    }

    /// Calendar- and future-filtered arrivals at one concrete stop id, in
    /// stop_times table order.
    fn candidate_arrivals(
        &self,
        stop_id: &str,
        line: Option<&str>,
        now: NaiveDateTime,
    ) -> Vec<Arrival> {
        let today = now.date();
        let now_seconds = now.time().num_seconds_from_midnight();
        let mut arrivals = Vec::new();
        let Some(rows) = self.stop_times_by_stop.get(stop_id) else {
            return arrivals;
        };
        for &row in rows {
            let stop_time = &self.stop_times[row];
            let Some(trip) = self.trips.get(&stop_time.trip_id) else {
                continue;
            };
            if let Some(line) = line {
                if trip.route_id != line {
                    continue;
                }
            }
            let Some(service_id) = self.trip_to_service.get(&stop_time.trip_id) else {
                continue;
            };
            if !self.service_runs_on(service_id, today) {
                continue;
            }
            if stop_time.arrival_time.normalized_seconds() <= now_seconds {
                continue;
            }
            arrivals.push(Arrival {
                line: trip.route_id.clone(),
                trip_id: stop_time.trip_id.clone(),
                arrival_time: stop_time.arrival_time,
                departure_time: stop_time.departure_time,
                stop_sequence: stop_time.stop_sequence,
            });
        }
        arrivals
    }
}
