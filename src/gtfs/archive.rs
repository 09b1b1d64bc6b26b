use std::collections::HashMap;
use std::io::{Cursor, ErrorKind, Read, Seek};

use zip::ZipArchive;

use crate::gtfs::error::Error;

/// Tables that must be present for a feed load to succeed.
pub const REQUIRED_TABLES: [&str; 7] = [
    "routes.txt",
    "stops.txt",
    "trips.txt",
    "stop_times.txt",
    "calendar.txt",
    "calendar_dates.txt",
    "transfers.txt",
];

/// Tables the loader knows how to read. Anything else in the archive, such as
/// shapes.txt, is skipped during enumeration.
const KNOWN_TABLES: [&str; 8] = [
    "agency.txt",
    "routes.txt",
    "stops.txt",
    "trips.txt",
    "stop_times.txt",
    "calendar.txt",
    "calendar_dates.txt",
    "transfers.txt",
];

/// A GTFS-static zip container with its entries enumerated up front.
///
/// Entries are matched by file name, so feeds that nest their tables under a
/// directory inside the archive still resolve. Enumeration completes before
/// any table is read; archive order carries no meaning.
pub struct FeedArchive<R: Read + Seek> {
    archive: ZipArchive<R>,
    entries: HashMap<&'static str, usize>,
}

impl FeedArchive<Cursor<Vec<u8>>> {
    /// Opens a feed from an in-memory byte buffer, e.g. a downloaded zip.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Error> {
        FeedArchive::from_reader(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> FeedArchive<R> {
    pub fn from_reader(reader: R) -> Result<Self, Error> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = HashMap::new();
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            let path = std::path::Path::new(entry.name());
            for table in &KNOWN_TABLES {
                if path.file_name() == Some(std::ffi::OsStr::new(table)) {
                    entries.insert(*table, i);
                    break;
                }
            }
        }
        Ok(FeedArchive { archive, entries })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Decodes a required table to UTF-8 text.
    pub fn table(&mut self, name: &str) -> Result<String, Error> {
        let index = *self
            .entries
            .get(name)
            .ok_or_else(|| Error::MissingEntry(name.to_owned()))?;
        let mut entry = self.archive.by_index(index)?;
        let mut text = String::new();
        entry.read_to_string(&mut text).map_err(|e| {
            if e.kind() == ErrorKind::InvalidData {
                Error::InvalidText(name.to_owned())
            } else {
                Error::Io(e)
            }
        })?;
        Ok(text)
    }

    /// Decodes an optional table, `None` when the entry is absent.
    pub fn optional_table(&mut self, name: &str) -> Option<Result<String, Error>> {
        if self.contains(name) {
            Some(self.table(name))
        } else {
            None
        }
    }
}
