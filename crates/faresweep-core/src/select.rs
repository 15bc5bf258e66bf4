//! Two-level cheapest-fare reduction.
//!
//! An offer with no fare of the requested class is priced as absent,
//! and absent compares greater than any real mileage cost, so such an
//! offer can never win unless every offer in the window lacks the
//! class, in which case the whole reduction yields `None` ("no
//! itinerary found"). Ties keep the first offer encountered; callers
//! iterate days in ascending query-date order so the first-encountered
//! rule means the earliest date wins among equally cheap offers.

use tracing::warn;

use crate::model::{Fare, FlightOffer};

/// A winning offer paired with the fare that priced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FarePick {
    pub offer: FlightOffer,
    pub fare: Fare,
}

impl FarePick {
    pub fn miles(&self) -> i64 {
        self.fare.miles
    }
}

/// Cheapest offer of a single day under `fare_class`, or `None` when no
/// offer carries a fare of that class.
pub fn cheapest_of_day(offers: &[FlightOffer], fare_class: &str) -> Option<FarePick> {
    let mut best: Option<FarePick> = None;
    for offer in offers {
        let Some(fare) = offer.fare_for(fare_class) else {
            warn!(
                offer_uid = %offer.uid,
                fare_class,
                "offer carries no fare of the requested class"
            );
            continue;
        };
        if best.as_ref().map_or(true, |b| fare.miles < b.fare.miles) {
            best = Some(FarePick {
                offer: offer.clone(),
                fare: fare.clone(),
            });
        }
    }
    best
}

/// Cheapest pick across a whole window, first-encountered winning ties.
pub fn cheapest_overall<'a, I>(picks: I) -> Option<&'a FarePick>
where
    I: IntoIterator<Item = &'a FarePick>,
{
    let mut best: Option<&FarePick> = None;
    for pick in picks {
        if best.map_or(true, |b| pick.fare.miles < b.fare.miles) {
            best = Some(pick);
        }
    }
    best
}
