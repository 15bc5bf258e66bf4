//! Wire-faithful model of the award fare-search API responses.
//!
//! Field names mirror the JSON the search endpoint returns; only the
//! timestamps need help, since the API emits them without a timezone
//! suffix and chrono's default RFC 3339 path rejects that.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// Timestamp layout used by the search endpoint, e.g. `2026-09-10T07:35:00`.
pub const WIRE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn wire_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, WIRE_TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
}

/// One priced redemption option attached to an offer.
///
/// The same `fare_class` may appear more than once in an offer's fare
/// list; selection always takes the first occurrence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Fare {
    #[serde(default)]
    pub uid: String,
    #[serde(rename = "type")]
    pub fare_class: String,
    pub miles: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Carrier {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Airport {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

/// Takeoff or landing point of an offer or one of its legs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LegEndpoint {
    #[serde(rename = "date", deserialize_with = "wire_timestamp")]
    pub timestamp: NaiveDateTime,
    pub airport: Airport,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub cabin: String,
    pub departure: LegEndpoint,
    pub arrival: LegEndpoint,
}

/// One bookable flight option for a given day and direction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub cabin: String,
    #[serde(default)]
    pub stops: u32,
    pub departure: LegEndpoint,
    pub arrival: LegEndpoint,
    #[serde(rename = "airline", default)]
    pub carrier: Carrier,
    #[serde(rename = "legList", default)]
    pub legs: Vec<Leg>,
    #[serde(rename = "fareList", default)]
    pub fares: Vec<Fare>,
}

impl FlightOffer {
    /// First fare of the given class, or `None` when the offer carries
    /// no fare of that class at all.
    pub fn fare_for(&self, fare_class: &str) -> Option<&Fare> {
        self.fares.iter().find(|fare| fare.fare_class == fare_class)
    }
}

/// Best advertised pricing the API attaches to a segment. Decoded for
/// fixture fidelity; the reduction works from the per-offer fare lists.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestPricing {
    #[serde(default)]
    pub miles: i64,
    #[serde(default)]
    pub source_fare: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AirportLists {
    #[serde(rename = "departureAirportList", default)]
    pub departure: Vec<Airport>,
    #[serde(rename = "arrivalAirportList", default)]
    pub arrival: Vec<Airport>,
}

/// The unit returned by one day's query: every offer the API found for
/// that (date, origin, destination) triple.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DaySegment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "flightList", default)]
    pub offers: Vec<FlightOffer>,
    #[serde(rename = "bestPricing", default)]
    pub best_pricing: BestPricing,
    #[serde(default)]
    pub airports: AirportLists,
}

/// Top-level search response body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "requestedFlightSegmentList", default)]
    pub segments: Vec<DaySegment>,
}

impl SearchResponse {
    /// The API returns exactly one relevant segment per single-day
    /// query; any additional segments are ignored, not merged.
    pub fn into_day_segment(self) -> Option<DaySegment> {
        self.segments.into_iter().next()
    }
}

/// One completed query: the requested date (not necessarily the date
/// flown) plus the segment the API returned for it.
#[derive(Debug, Clone, PartialEq)]
pub struct DayResult {
    pub query_date: NaiveDate,
    pub segment: DaySegment,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct TaxTotal {
    #[serde(default)]
    pub miles: i64,
    #[serde(default)]
    pub money: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxTotals {
    #[serde(default)]
    pub total: TaxTotal,
    #[serde(default)]
    pub total_fare: TaxTotal,
}

/// Boarding-tax quote for one (offer, fare) pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct BoardingTax {
    #[serde(default)]
    pub totals: TaxTotals,
}

impl BoardingTax {
    pub fn money(&self) -> f64 {
        self.totals.total_fare.money
    }

    pub fn miles(&self) -> i64 {
        self.totals.total_fare.miles
    }
}
