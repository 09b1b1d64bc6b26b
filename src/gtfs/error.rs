use thiserror::Error;

/// An error that can occur while loading a GTFS-static feed.
#[derive(Error, Debug)]
pub enum Error {
    /// A required table is not present in the feed archive
    #[error("could not find table {0} in the feed archive")]
    MissingEntry(String),
    /// A row does not satisfy the structural minimum of its table
    #[error("malformed row in '{file_name}'")]
    MalformedRow {
        /// Table whose row could not be parsed
        file_name: String,
        /// The initial error by the csv library
        #[source]
        source: csv::Error,
        /// The row that could not be parsed
        line_in_error: Option<LineError>,
    },
    /// An archive entry is not valid UTF-8 text
    #[error("entry '{0}' is not valid UTF-8 text")]
    InvalidText(String),
    /// A time field is not of the form HH:MM:SS
    #[error("'{0}' is not a valid GTFS time")]
    InvalidTime(String),
    /// A date field is not of the form YYYYMMDD
    #[error("'{0}' is not a valid GTFS date")]
    InvalidDate(String),
    /// Generic Input/Output error while reading the feed
    #[error("impossible to read feed")]
    Io(#[from] std::io::Error),
    /// Error when reading the zip container
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

/// Specific row from a table that could not be parsed
#[derive(Debug)]
pub struct LineError {
    /// Headers of the table
    pub headers: Vec<String>,
    /// Values of the row that could not be parsed
    pub values: Vec<String>,
}
