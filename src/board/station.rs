use std::collections::{BTreeSet, HashMap};

use clap::ValueEnum;
use serde::Serialize;

use crate::gtfs::structs::Stop;

/// Platform direction, encoded by the trailing letter of a stop id in feeds
/// that split stations into directional platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
}

impl Direction {
    /// Detects the directional suffix of a platform stop id. Only an exact,
    /// case-sensitive trailing `N` or `S` counts; no other suffix is
    /// recognized.
    pub fn from_stop_id(stop_id: &str) -> Option<Direction> {
        if stop_id.ends_with('N') {
            Some(Direction::North)
        } else if stop_id.ends_with('S') {
            Some(Direction::South)
        } else {
            None
        }
    }
}

/// The directional platform stop ids of a station, where they exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectionMap {
    pub north: Option<String>,
    pub south: Option<String>,
}

impl DirectionMap {
    pub fn get(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::North => self.north.as_deref(),
            Direction::South => self.south.as_deref(),
        }
    }

    pub fn set(&mut self, direction: Direction, stop_id: String) {
        match direction {
            Direction::North => self.north = Some(stop_id),
            Direction::South => self.south = Some(stop_id),
        }
    }
}

/// A logical passenger-facing station, folded together from a parent stop
/// and its directional child platforms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    /// Anchor stop id: the parent station id, or the stop's own id when it
    /// has no parent.
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Route ids serving any platform of this station.
    pub lines: BTreeSet<String>,
    pub directions: DirectionMap,
}

/// Folds the stop table into the station registry, single pass.
///
/// Name and coordinates come from whichever stop record creates the station
/// (first seen wins); direction assignments are overwritten as later platform
/// records arrive (last seen wins). Also returns the platform → anchor
/// mapping used to resolve stop_times rows to stations.
pub(crate) fn fold_stations(
    stops: &[Stop],
) -> (HashMap<String, Station>, HashMap<String, String>) {
    let mut stations: HashMap<String, Station> = HashMap::new();
    let mut stop_to_station = HashMap::new();
    for stop in stops {
        let anchor = stop
            .parent_station
            .clone()
            .unwrap_or_else(|| stop.stop_id.clone());
        let station = stations.entry(anchor.clone()).or_insert_with(|| Station {
            id: anchor.clone(),
            name: stop.stop_name.clone().unwrap_or_default(),
            lat: stop.stop_lat.unwrap_or_default(),
            lon: stop.stop_lon.unwrap_or_default(),
            lines: BTreeSet::new(),
            directions: DirectionMap::default(),
        });
        if let Some(direction) = Direction::from_stop_id(&stop.stop_id) {
            station.directions.set(direction, stop.stop_id.clone());
        }
        stop_to_station.insert(stop.stop_id.clone(), anchor);
    }
    (stations, stop_to_station)
}
