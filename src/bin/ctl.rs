use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};

use transit_board::board::arrivals::Arrival;
use transit_board::board::snapshot::load_feed_from_path;
use transit_board::board::station::Direction;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a GTFS-static zip archive
    #[arg(long)]
    gtfs_path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the feed and print snapshot statistics
    Stats,
    /// List all lines in the feed
    Lines,
    /// List the stations served by a line
    Stations {
        #[arg(long)]
        line: String,
    },
    /// Show one station
    Station {
        #[arg(long)]
        id: String,
    },
    /// Show upcoming arrivals at a station
    Arrivals {
        #[arg(long)]
        station: String,

        #[arg(long, value_enum)]
        direction: Option<Direction>,

        #[arg(long)]
        line: Option<String>,

        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Query time as HH:MM:SS, defaults to the current local time
        #[arg(long)]
        at: Option<String>,

        /// Query date as YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Print the arrivals as JSON
        #[arg(long)]
        json: bool,
    },
    /// Next train in each direction at a station
    Board {
        #[arg(long)]
        station: String,
    },
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    println!("Reading feed from path: {}", args.gtfs_path);
    let snapshot = load_feed_from_path(&args.gtfs_path).unwrap();

    match args.command {
        Command::Stats => snapshot.print_stats(),
        Command::Lines => {
            for route in snapshot.list_lines() {
                let name = route
                    .route_long_name
                    .as_deref()
                    .or(route.route_short_name.as_deref())
                    .unwrap_or("");
                println!("{}\t{}", route.route_id, name);
            }
        }
        Command::Stations { line } => {
            for station in snapshot.stations_for_line(&line) {
                println!("{}\t{}", station.id, station.name);
            }
        }
        Command::Station { id } => match snapshot.get_station(&id) {
            Some(station) => println!("{}", serde_json::to_string_pretty(station).unwrap()),
            None => println!("station {} not found", id),
        },
        Command::Arrivals {
            station,
            direction,
            line,
            limit,
            at,
            date,
            json,
        } => {
            let now = query_instant(at.as_deref(), date.as_deref());
            let arrivals =
                snapshot.upcoming_arrivals(&station, direction, line.as_deref(), limit, now);
            if json {
                println!("{}", serde_json::to_string_pretty(&arrivals).unwrap());
            } else {
                for arrival in arrivals {
                    println!(
                        "{}\t{}\t{}\t(seq {})",
                        arrival.arrival_time, arrival.line, arrival.trip_id, arrival.stop_sequence
                    );
                }
            }
        }
        Command::Board { station } => {
            let board = snapshot.next_train_per_direction(&station, Local::now().naive_local());
            print_board_slot("north", &board.north);
            print_board_slot("south", &board.south);
        }
    }
}

fn print_board_slot(direction: &str, arrival: &Option<Arrival>) {
    match arrival {
        Some(arrival) => println!(
            "{}: {} line {} trip {}",
            direction, arrival.arrival_time, arrival.line, arrival.trip_id
        ),
        None => println!("{}: no upcoming train", direction),
    }
}

fn query_instant(at: Option<&str>, date: Option<&str>) -> NaiveDateTime {
    let now = Local::now().naive_local();
    let date = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date must be YYYY-MM-DD"),
        None => now.date(),
    };
    let time = match at {
        Some(s) => NaiveTime::parse_from_str(s, "%H:%M:%S").expect("time must be HH:MM:SS"),
        None => now.time(),
    };
    date.and_time(time)
}
