use std::io::{Read, Seek};

use serde::Deserialize;

use crate::gtfs::archive::FeedArchive;
use crate::gtfs::error::{Error, LineError};
use crate::gtfs::structs::*;

/// The seven base tables of a feed, parsed but not yet indexed.
#[derive(Debug, Default)]
pub struct RawFeed {
    pub agencies: Vec<Agency>,
    pub routes: Vec<Route>,
    pub stops: Vec<Stop>,
    pub trips: Vec<Trip>,
    pub stop_times: Vec<StopTime>,
    pub calendar: Vec<Calendar>,
    pub calendar_dates: Vec<CalendarDate>,
    pub transfers: Vec<Transfer>,
}

impl RawFeed {
    /// Parses every required table out of the archive. Any missing required
    /// entry or malformed row aborts the whole load.
    pub fn from_archive<R: Read + Seek>(archive: &mut FeedArchive<R>) -> Result<RawFeed, Error> {
        Ok(RawFeed {
            agencies: match archive.optional_table("agency.txt") {
                Some(text) => read_records(&text?, "agency.txt")?,
                None => Vec::new(),
            },
            routes: read_table(archive, "routes.txt")?,
            stops: read_table(archive, "stops.txt")?,
            trips: read_table(archive, "trips.txt")?,
            stop_times: read_table(archive, "stop_times.txt")?,
            calendar: read_table(archive, "calendar.txt")?,
            calendar_dates: read_table(archive, "calendar_dates.txt")?,
            transfers: read_table(archive, "transfers.txt")?,
        })
    }

    pub fn print_stats(&self) {
        println!("Feed tables:");
        println!("  Agencies: {}", self.agencies.len());
        println!("  Routes: {}", self.routes.len());
        println!("  Stops: {}", self.stops.len());
        println!("  Trips: {}", self.trips.len());
        println!("  Stop times: {}", self.stop_times.len());
        println!("  Calendar: {}", self.calendar.len());
        println!("  Calendar dates: {}", self.calendar_dates.len());
        println!("  Transfers: {}", self.transfers.len());
    }
}

fn read_table<O, R>(archive: &mut FeedArchive<R>, name: &str) -> Result<Vec<O>, Error>
where
    for<'de> O: Deserialize<'de>,
    R: Read + Seek,
{
    read_records(&archive.table(name)?, name)
}

/// Parses one delimited table: the first line is authoritative for field
/// names, every following row is keyed positionally against those headers.
pub fn read_records<O>(text: &str, file_name: &str) -> Result<Vec<O>, Error>
where
    for<'de> O: Deserialize<'de>,
{
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(text.as_bytes());
    // We store the headers to be able to return them in case of errors
    let headers = reader
        .headers()
        .map_err(|e| Error::MalformedRow {
            file_name: file_name.to_owned(),
            source: e,
            line_in_error: None,
        })?
        .clone()
        .into_iter()
        .map(|h| h.trim())
        .collect::<csv::StringRecord>();

    // Pre-allocate a StringRecord for performance reasons
    let mut rec = csv::StringRecord::new();
    let mut objs = Vec::new();

    // Read each record into the pre-allocated StringRecord one at a time
    while reader.read_record(&mut rec).map_err(|e| Error::MalformedRow {
        file_name: file_name.to_owned(),
        source: e,
        line_in_error: None,
    })? {
        let obj = rec
            .deserialize(Some(&headers))
            .map_err(|e| Error::MalformedRow {
                file_name: file_name.to_owned(),
                source: e,
                line_in_error: Some(LineError {
                    headers: headers.into_iter().map(String::from).collect(),
                    values: rec.into_iter().map(String::from).collect(),
                }),
            })?;
        objs.push(obj);
    }
    Ok(objs)
}
