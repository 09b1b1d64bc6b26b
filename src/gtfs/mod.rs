pub mod archive;
pub mod error;
pub mod raw_feed;
pub mod serde_helpers;
pub mod structs;
pub mod time;
