//! Core domain model and cheapest-fare reduction for faresweep.

pub mod model;
pub mod select;

pub use model::{
    Airport, AirportLists, BestPricing, BoardingTax, Carrier, DayResult, DaySegment, Fare,
    FlightOffer, Leg, LegEndpoint, SearchResponse,
};
pub use select::{cheapest_of_day, cheapest_overall, FarePick};

/// Fare class the sweep hunts for unless overridden at the boundary.
pub const DEFAULT_FARE_CLASS: &str = "SMILES_CLUB";
