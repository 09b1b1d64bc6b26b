use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use log::debug;

use crate::board::station::{fold_stations, Station};
use crate::gtfs::archive::FeedArchive;
use crate::gtfs::error::Error;
use crate::gtfs::raw_feed::RawFeed;
use crate::gtfs::structs::*;

/// The immutable, fully indexed result of one feed load.
///
/// A snapshot owns the base tables plus every derived index and is treated
/// as read-only for its whole lifetime; reloading a feed builds a fresh
/// snapshot and swaps it in wholesale through [`SnapshotStore`].
pub struct Snapshot {
    pub routes: HashMap<String, Route>,
    pub stops: HashMap<String, Stop>,
    pub trips: HashMap<String, Trip>,
    pub stop_times: Vec<StopTime>,
    pub calendar: HashMap<String, Calendar>,
    /// Exception rows keyed by exactly (service id, date).
    pub calendar_dates: HashMap<(String, NaiveDate), ExceptionType>,
    pub transfers: Vec<Transfer>,

    /// Station registry keyed by anchor stop id.
    pub stations: HashMap<String, Station>,
    /// Platform stop id → anchor station id.
    pub stop_to_station: HashMap<String, String>,
    pub trip_to_service: HashMap<String, String>,
    pub route_trips: HashMap<String, Vec<String>>,
    /// Route id → anchor ids of the stations its trips touch.
    pub line_stations: HashMap<String, BTreeSet<String>>,
    /// Stop id → row indexes into `stop_times`, in table order.
    pub stop_times_by_stop: HashMap<String, Vec<usize>>,
}

impl Snapshot {
    /// Builds the snapshot from parsed tables, one pass per table.
    ///
    /// Joins are permissive: a stop_time or trip referencing an unknown id
    /// is left out of the derived indices instead of aborting the build, so
    /// every index entry points at a row present in the base tables.
    pub fn build(raw: RawFeed) -> Snapshot {
        let (mut stations, stop_to_station) = fold_stations(&raw.stops);

        let routes = to_map(raw.routes);
        let stops = to_map(raw.stops);
        let trips = to_map(raw.trips);
        let calendar = to_map(raw.calendar);
        let calendar_dates: HashMap<(String, NaiveDate), ExceptionType> = raw
            .calendar_dates
            .into_iter()
            .map(|c| ((c.service_id, c.date), c.exception_type))
            .collect();

        let mut trip_to_service = HashMap::with_capacity(trips.len());
        let mut route_trips: HashMap<String, Vec<String>> = HashMap::new();
        for trip in trips.values() {
            trip_to_service.insert(trip.trip_id.clone(), trip.service_id.clone());
            if !routes.contains_key(&trip.route_id) {
                debug!(
                    "trip {} references unknown route {}, not indexed",
                    trip.trip_id, trip.route_id
                );
                continue;
            }
            route_trips
                .entry(trip.route_id.clone())
                .or_default()
                .push(trip.trip_id.clone());
        }
        // HashMap iteration order is arbitrary; sort for deterministic indices.
        for trip_ids in route_trips.values_mut() {
            trip_ids.sort();
        }

        // Single scan of stop_times, bucketed by stop and by trip. Per-route
        // rescans of this table would be O(routes × stop_times).
        let mut stop_times_by_stop: HashMap<String, Vec<usize>> = HashMap::new();
        let mut trip_stops: HashMap<&str, Vec<&str>> = HashMap::new();
        for (index, stop_time) in raw.stop_times.iter().enumerate() {
            if !trips.contains_key(&stop_time.trip_id) {
                debug!(
                    "stop_time references unknown trip {}, dropped",
                    stop_time.trip_id
                );
                continue;
            }
            if !stops.contains_key(&stop_time.stop_id) {
                debug!(
                    "stop_time references unknown stop {}, dropped",
                    stop_time.stop_id
                );
                continue;
            }
            stop_times_by_stop
                .entry(stop_time.stop_id.clone())
                .or_default()
                .push(index);
            trip_stops
                .entry(stop_time.trip_id.as_str())
                .or_default()
                .push(stop_time.stop_id.as_str());
        }

        let mut line_stations: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (route_id, trip_ids) in &route_trips {
            let anchors = line_stations.entry(route_id.clone()).or_default();
            for trip_id in trip_ids {
                let Some(stop_ids) = trip_stops.get(trip_id.as_str()) else {
                    continue;
                };
                for stop_id in stop_ids {
                    let Some(anchor) = stop_to_station.get(*stop_id) else {
                        continue;
                    };
                    anchors.insert(anchor.clone());
                    if let Some(station) = stations.get_mut(anchor) {
                        station.lines.insert(route_id.clone());
                    }
                }
            }
        }

        Snapshot {
            routes,
            stops,
            trips,
            stop_times: raw.stop_times,
            calendar,
            calendar_dates,
            transfers: raw.transfers,
            stations,
            stop_to_station,
            trip_to_service,
            route_trips,
            line_stations,
            stop_times_by_stop,
        }
    }

    pub fn print_stats(&self) {
        println!("Feed snapshot:");
        println!("  Routes: {}", self.routes.len());
        println!("  Stops: {}", self.stops.len());
        println!("  Stations: {}", self.stations.len());
        println!("  Trips: {}", self.trips.len());
        println!("  Stop times: {}", self.stop_times.len());
        println!("  Services: {}", self.calendar.len());
        println!("  Service exceptions: {}", self.calendar_dates.len());
        println!("  Transfers: {}", self.transfers.len());
    }
}

fn to_map<O: Id>(elements: Vec<O>) -> HashMap<String, O> {
    elements
        .into_iter()
        .map(|e| (e.id().to_owned(), e))
        .collect()
}

/// Loads a feed from zip bytes and builds its snapshot.
pub fn load_feed(bytes: Vec<u8>) -> Result<Snapshot, Error> {
    let mut archive = FeedArchive::from_bytes(bytes)?;
    let raw = RawFeed::from_archive(&mut archive)?;
    Ok(Snapshot::build(raw))
}

/// Loads a feed zip from disk and builds its snapshot.
pub fn load_feed_from_path<P: AsRef<Path>>(path: P) -> Result<Snapshot, Error> {
    let file = File::open(path)?;
    let mut archive = FeedArchive::from_reader(file)?;
    let raw = RawFeed::from_archive(&mut archive)?;
    Ok(Snapshot::build(raw))
}

/// Holds the currently published snapshot behind an [`Arc`].
///
/// `publish` replaces the snapshot wholesale; readers that already cloned
/// the Arc keep querying their consistent view while new queries see the
/// replacement. A half-built snapshot is never observable because the
/// builder finishes before `publish` is called.
#[derive(Default)]
pub struct SnapshotStore {
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> SnapshotStore {
        SnapshotStore::default()
    }

    pub fn publish(&self, snapshot: Snapshot) {
        let mut guard = self.current.write().unwrap();
        *guard = Some(Arc::new(snapshot));
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().unwrap().clone()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gtfs::time::ServiceTime;

    pub(crate) fn stop(id: &str, parent: Option<&str>) -> Stop {
        Stop {
            stop_id: id.to_owned(),
            stop_name: Some(format!("{} name", id)),
            stop_lat: Some(40.75),
            stop_lon: Some(-73.98),
            location_type: None,
            parent_station: parent.map(str::to_owned),
        }
    }

    pub(crate) fn route(id: &str) -> Route {
        Route {
            route_id: id.to_owned(),
            agency_id: Some("MTA".to_owned()),
            route_short_name: Some(id.to_owned()),
            route_long_name: None,
            route_desc: None,
            route_type: 1,
            route_url: None,
            route_color: None,
            route_text_color: None,
        }
    }

    pub(crate) fn trip(id: &str, route_id: &str, service_id: &str) -> Trip {
        Trip {
            route_id: route_id.to_owned(),
            service_id: service_id.to_owned(),
            trip_id: id.to_owned(),
            trip_headsign: None,
            direction_id: None,
            shape_id: None,
        }
    }

    pub(crate) fn stop_time(trip_id: &str, stop_id: &str, time: &str, sequence: u32) -> StopTime {
        StopTime {
            trip_id: trip_id.to_owned(),
            arrival_time: ServiceTime::parse(time).unwrap(),
            departure_time: ServiceTime::parse(time).unwrap(),
            stop_id: stop_id.to_owned(),
            stop_sequence: sequence,
        }
    }

    pub(crate) fn everyday_calendar(service_id: &str) -> Calendar {
        Calendar {
            service_id: service_id.to_owned(),
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: true,
            sunday: true,
            start_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2099, 12, 31).unwrap(),
        }
    }

    pub(crate) fn sample_feed() -> RawFeed {
        RawFeed {
            agencies: Vec::new(),
            routes: vec![route("R1"), route("R2")],
            stops: vec![
                stop("STA", None),
                stop("S1N", Some("STA")),
                stop("S1S", Some("STA")),
                stop("STB", None),
            ],
            trips: vec![trip("T1", "R1", "WKD"), trip("T2", "R2", "WKD")],
            stop_times: vec![
                stop_time("T1", "S1N", "08:05:00", 1),
                stop_time("T1", "S1S", "08:10:00", 2),
                stop_time("T2", "STB", "09:00:00", 1),
            ],
            calendar: vec![everyday_calendar("WKD")],
            calendar_dates: Vec::new(),
            transfers: Vec::new(),
        }
    }

    #[test]
    fn builds_trip_and_route_indices() {
        let snapshot = Snapshot::build(sample_feed());
        assert_eq!("WKD", snapshot.trip_to_service["T1"]);
        assert_eq!(vec!["T1".to_owned()], snapshot.route_trips["R1"]);
        assert_eq!(3, snapshot.stop_times.len());
        assert_eq!(vec![0], snapshot.stop_times_by_stop["S1N"]);
        assert_eq!(vec![1], snapshot.stop_times_by_stop["S1S"]);
    }

    #[test]
    fn line_stations_union_children_into_anchor() {
        let snapshot = Snapshot::build(sample_feed());
        let anchors: Vec<&String> = snapshot.line_stations["R1"].iter().collect();
        assert_eq!(vec!["STA"], anchors);
        assert!(snapshot.stations["STA"].lines.contains("R1"));
        assert!(!snapshot.stations["STA"].lines.contains("R2"));
        assert!(snapshot.stations["STB"].lines.contains("R2"));
    }

    #[test]
    fn dangling_references_are_dropped_not_fatal() {
        let mut raw = sample_feed();
        raw.stop_times.push(stop_time("T1", "GHOST", "08:20:00", 3));
        raw.stop_times.push(stop_time("NO-TRIP", "STA", "08:25:00", 1));
        raw.trips.push(trip("T3", "NO-ROUTE", "WKD"));
        let snapshot = Snapshot::build(raw);
        assert!(!snapshot.stop_times_by_stop.contains_key("GHOST"));
        assert!(!snapshot.stop_times_by_stop.contains_key("STA"));
        assert!(!snapshot.route_trips.contains_key("NO-ROUTE"));
        // The trip is still a base record with a service mapping.
        assert_eq!("WKD", snapshot.trip_to_service["T3"]);
    }

    #[test]
    fn empty_tables_build_empty_indices() {
        let snapshot = Snapshot::build(RawFeed::default());
        assert!(snapshot.stations.is_empty());
        assert!(snapshot.line_stations.is_empty());
        assert!(snapshot.stop_times_by_stop.is_empty());
    }

    #[test]
    fn rebuilding_the_same_feed_is_deterministic() {
        let first = Snapshot::build(sample_feed());
        let second = Snapshot::build(sample_feed());
        assert_eq!(first.stations, second.stations);
        assert_eq!(first.line_stations, second.line_stations);
        assert_eq!(first.route_trips, second.route_trips);
        assert_eq!(first.trip_to_service, second.trip_to_service);
        assert_eq!(first.stop_times_by_stop, second.stop_times_by_stop);
    }

    fn zip_feed(entries: &[(&str, &str)]) -> Vec<u8> {
        use std::io::Write;
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, text) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(text.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn fixture_entries() -> Vec<(&'static str, &'static str)> {
        vec![
            (
                "routes.txt",
                "route_id,agency_id,route_short_name,route_long_name,route_type\n\
                 R1,MTA,R1,Test Line,1\n",
            ),
            (
                "stops.txt",
                "stop_id,stop_name,stop_lat,stop_lon,location_type,parent_station\n\
                 STA,Test St,40.75,-73.98,1,\n\
                 S1N,Test St,40.75,-73.98,0,STA\n\
                 S1S,Test St,40.75,-73.98,0,STA\n",
            ),
            (
                "trips.txt",
                "route_id,service_id,trip_id,trip_headsign,direction_id,shape_id\n\
                 R1,ALL,T1,Uptown,0,\n",
            ),
            (
                "stop_times.txt",
                "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
                 T1,08:05:00,08:05:30,S1N,1\n\
                 T1,08:10:00,08:10:30,S1S,2\n",
            ),
            (
                "calendar.txt",
                "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
                 ALL,1,1,1,1,1,1,1,20000101,20991231\n",
            ),
            ("calendar_dates.txt", "service_id,date,exception_type\n"),
            (
                "transfers.txt",
                "from_stop_id,to_stop_id,transfer_type,min_transfer_time\nSTA,STA,2,180\n",
            ),
        ]
    }

    #[test]
    fn loads_a_feed_zip_end_to_end() {
        use crate::board::station::Direction;
        use chrono::NaiveTime;

        let snapshot = load_feed(zip_feed(&fixture_entries())).unwrap();

        let line_ids: Vec<&str> = snapshot
            .list_lines()
            .iter()
            .map(|r| r.route_id.as_str())
            .collect();
        assert_eq!(vec!["R1"], line_ids);

        let station_ids: Vec<&str> = snapshot
            .stations_for_line("R1")
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(vec!["STA"], station_ids);

        let now = NaiveDate::from_ymd_opt(2024, 3, 11)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        let arrivals =
            snapshot.upcoming_arrivals("STA", Some(Direction::North), None, 10, now);
        assert_eq!(1, arrivals.len());
        assert_eq!("08:05:00", arrivals[0].arrival_time.to_string());
        assert_eq!("08:05:30", arrivals[0].departure_time.to_string());
    }

    #[test]
    fn missing_required_table_aborts_the_load() {
        let entries: Vec<(&str, &str)> = fixture_entries()
            .into_iter()
            .filter(|(name, _)| *name != "calendar_dates.txt")
            .collect();
        match load_feed(zip_feed(&entries)) {
            Err(Error::MissingEntry(name)) => assert_eq!("calendar_dates.txt", name),
            Err(other) => panic!("expected MissingEntry, got {}", other),
            Ok(_) => panic!("load must not produce a snapshot"),
        }
    }

    #[test]
    fn identical_bytes_load_to_identical_indices() {
        let bytes = zip_feed(&fixture_entries());
        let first = load_feed(bytes.clone()).unwrap();
        let second = load_feed(bytes).unwrap();
        assert_eq!(first.stations, second.stations);
        assert_eq!(first.line_stations, second.line_stations);
        assert_eq!(first.stop_times_by_stop, second.stop_times_by_stop);
    }

    #[test]
    fn store_swaps_snapshots_wholesale() {
        let store = SnapshotStore::new();
        assert!(store.current().is_none());
        store.publish(Snapshot::build(sample_feed()));
        let held = store.current().unwrap();

        let mut smaller = sample_feed();
        smaller.routes.truncate(1);
        store.publish(Snapshot::build(smaller));

        // The in-flight reader keeps its consistent view.
        assert_eq!(2, held.routes.len());
        assert_eq!(1, store.current().unwrap().routes.len());
    }
}
