//! Plain-text rendering of a completed sweep.

use faresweep_core::FarePick;
use faresweep_search::{DirectionReport, SweepReport};

pub fn render(sweep: &SweepReport, fare_class: &str) -> String {
    let mut out = String::new();
    direction_section(&mut out, &sweep.outbound, fare_class);
    direction_section(&mut out, &sweep.inbound, fare_class);
    out.push_str(&format!("Queries took {:?}\n", sweep.elapsed));
    out
}

fn direction_section(out: &mut String, report: &DirectionReport, fare_class: &str) {
    out.push_str(&format!(
        "{} FLIGHTS\n",
        report.direction.label().to_uppercase()
    ));

    for day in &report.days {
        match &day.cheapest {
            Some(pick) => out.push_str(&format!(
                "cheapest of {}: {}\n",
                day.query_date(),
                offer_line(pick)
            )),
            None => out.push_str(&format!(
                "cheapest of {}: no {} fare offered\n",
                day.query_date(),
                fare_class
            )),
        }
    }

    if report.is_partial() {
        let dates: Vec<String> = report
            .failures
            .iter()
            .map(|failure| failure.query_date.to_string())
            .collect();
        out.push_str(&format!(
            "failed dates ({}): {}\n",
            report.failures.len(),
            dates.join(", ")
        ));
    }

    match &report.best {
        Some(pick) => {
            out.push_str(&format!("\nCheapest in this window: {}", offer_line(pick)));
            if let Some(tax) = &report.tax {
                out.push_str(&format!(" (+ ARS {:.2} boarding tax)", tax.money()));
            }
            out.push('\n');
        }
        None => out.push_str(&format!(
            "\nNo {fare_class} itinerary found in this window.\n"
        )),
    }
    out.push('\n');
}

fn offer_line(pick: &FarePick) -> String {
    format!(
        "{}, {} - {}, {}, {}, {} stops, {} miles",
        pick.offer.departure.timestamp.date(),
        pick.offer.departure.airport.code,
        pick.offer.arrival.airport.code,
        pick.offer.cabin,
        pick.offer.carrier.name,
        pick.offer.stops,
        pick.fare.miles,
    )
}
