use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::gtfs::serde_helpers::{
    deserialize_bool, deserialize_date, deserialize_opt, serialize_bool, serialize_date,
};
use crate::gtfs::time::ServiceTime;

pub trait Id {
    fn id(&self) -> &str;
}

/// Agency representing a public transit operator.
/// https://gtfs.org/documentation/schedule/reference/#agencytxt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agency {
    pub agency_id: Option<String>,
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
    pub agency_lang: Option<String>,
    pub agency_phone: Option<String>,
}

impl Id for Agency {
    fn id(&self) -> &str {
        match &self.agency_id {
            None => "",
            Some(id) => id,
        }
    }
}

/// A transit line.
/// https://gtfs.org/documentation/schedule/reference/#routestxt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub route_id: String,
    pub agency_id: Option<String>,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
    pub route_desc: Option<String>,
    pub route_type: i32,
    pub route_url: Option<String>,
    pub route_color: Option<String>,
    pub route_text_color: Option<String>,
}

impl Id for Route {
    fn id(&self) -> &str {
        &self.route_id
    }
}

/// A physical stop or station. A stop with no `parent_station` anchors a
/// logical station; a stop whose id carries a directional suffix is a
/// platform of its parent.
/// https://gtfs.org/documentation/schedule/reference/#stopstxt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub stop_id: String,
    pub stop_name: Option<String>,
    pub stop_lat: Option<f64>,
    pub stop_lon: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub location_type: Option<i32>,
    pub parent_station: Option<String>,
}

impl Id for Stop {
    fn id(&self) -> &str {
        &self.stop_id
    }
}

/// A scheduled run of a vehicle along a route.
/// https://gtfs.org/documentation/schedule/reference/#tripstxt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
    pub trip_headsign: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub direction_id: Option<i16>,
    pub shape_id: Option<String>,
}

impl Id for Trip {
    fn id(&self) -> &str {
        &self.trip_id
    }
}

/// One scheduled stop of a trip. Not unique per (trip, stop): looped routes
/// may visit the same stop twice, so stop times are a plain record list.
/// https://gtfs.org/documentation/schedule/reference/#stop_timestxt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopTime {
    pub trip_id: String,
    pub arrival_time: ServiceTime,
    pub departure_time: ServiceTime,
    pub stop_id: String,
    pub stop_sequence: u32,
}

/// Weekly schedule of a service.
/// https://gtfs.org/documentation/schedule/reference/#calendartxt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub service_id: String,
    #[serde(deserialize_with = "deserialize_bool", serialize_with = "serialize_bool")]
    pub monday: bool,
    #[serde(deserialize_with = "deserialize_bool", serialize_with = "serialize_bool")]
    pub tuesday: bool,
    #[serde(deserialize_with = "deserialize_bool", serialize_with = "serialize_bool")]
    pub wednesday: bool,
    #[serde(deserialize_with = "deserialize_bool", serialize_with = "serialize_bool")]
    pub thursday: bool,
    #[serde(deserialize_with = "deserialize_bool", serialize_with = "serialize_bool")]
    pub friday: bool,
    #[serde(deserialize_with = "deserialize_bool", serialize_with = "serialize_bool")]
    pub saturday: bool,
    #[serde(deserialize_with = "deserialize_bool", serialize_with = "serialize_bool")]
    pub sunday: bool,
    #[serde(deserialize_with = "deserialize_date", serialize_with = "serialize_date")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_date", serialize_with = "serialize_date")]
    pub end_date: NaiveDate,
}

impl Id for Calendar {
    fn id(&self) -> &str {
        &self.service_id
    }
}

/// Exception for the schedule of a service on one date.
/// https://gtfs.org/documentation/schedule/reference/#calendar_datestxt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDate {
    pub service_id: String,
    #[serde(deserialize_with = "deserialize_date", serialize_with = "serialize_date")]
    pub date: NaiveDate,
    pub exception_type: ExceptionType,
}

/// Type of schedule exception.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ExceptionType {
    #[serde(rename = "1")]
    Added,
    #[serde(rename = "2")]
    Removed,
}

/// Rules for making connections at transfer points between routes.
/// Carried as passthrough data; not used by the query engine.
/// https://gtfs.org/documentation/schedule/reference/#transferstxt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub from_stop_id: String,
    pub to_stop_id: String,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub transfer_type: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub min_transfer_time: Option<i64>,
}
