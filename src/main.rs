use std::env;
use std::process;

use log::info;

use transit_board::board::snapshot::{load_feed_from_path, SnapshotStore};

fn main() {
    env_logger::init();

    let path = match env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: transit-board <feed.zip>");
            process::exit(2);
        }
    };

    info!("loading feed from {}", path);
    let snapshot = match load_feed_from_path(&path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("failed to load feed {}: {}", path, e);
            process::exit(1);
        }
    };
    snapshot.print_stats();

    let store = SnapshotStore::new();
    store.publish(snapshot);

    let snapshot = match store.current() {
        Some(snapshot) => snapshot,
        None => return,
    };
    let now = chrono::Local::now().naive_local();
    for route in snapshot.list_lines() {
        let stations = snapshot.stations_for_line(&route.route_id);
        info!("line {}: {} stations", route.route_id, stations.len());
        if let Some(station) = stations.first() {
            let board = snapshot.next_train_per_direction(&station.id, now);
            info!(
                "  next at {}: north {:?}, south {:?}",
                station.name,
                board.north.map(|a| a.arrival_time.to_string()),
                board.south.map(|a| a.arrival_time.to_string())
            );
        }
    }
}
