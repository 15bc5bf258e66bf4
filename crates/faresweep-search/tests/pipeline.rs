//! End-to-end sweep tests over a scripted byte source: no network, same
//! decoding and reduction path as a live run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use faresweep_client::{ByteSource, FareClient, FetchError, Url};
use faresweep_search::{SearchConfig, SweepEngine};

const TAX_BODY: &str =
    r#"{"totals":{"total":{"miles":1200,"money":120.0},"totalFare":{"miles":0,"money":84.3}}}"#;

/// Serves canned search payloads keyed by the `departureDate` query
/// parameter and counts boarding-tax requests. Dates with no entry get
/// an empty body, which the client reports as a fetch failure.
struct ScriptedSource {
    search_bodies: HashMap<String, String>,
    search_calls: AtomicUsize,
    tax_calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(days: Vec<(&str, String)>) -> Arc<Self> {
        Arc::new(Self {
            search_bodies: days
                .into_iter()
                .map(|(date, body)| (date.to_string(), body))
                .collect(),
            search_calls: AtomicUsize::new(0),
            tax_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ByteSource for ScriptedSource {
    async fn fetch(&self, _run_id: Uuid, url: &Url) -> Result<Vec<u8>, FetchError> {
        if url.path().ends_with("/boardingtax") {
            self.tax_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(TAX_BODY.as_bytes().to_vec());
        }

        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let date = url
            .query_pairs()
            .find(|(key, _)| key == "departureDate")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        Ok(self
            .search_bodies
            .get(&date)
            .map(|body| body.as_bytes().to_vec())
            .unwrap_or_default())
    }
}

fn offer(uid: &str, club_miles: Option<i64>) -> serde_json::Value {
    let mut fares = vec![json!({"uid": format!("{uid}-std"), "type": "SMILES", "miles": 99000})];
    if let Some(miles) = club_miles {
        fares.push(json!({"uid": format!("{uid}-club"), "type": "SMILES_CLUB", "miles": miles}));
    }
    json!({
        "uid": uid,
        "cabin": "ECONOMIC",
        "stops": 0,
        "departure": {"date": "2026-09-10T08:00:00", "airport": {"code": "EZE"}},
        "arrival": {"date": "2026-09-10T15:00:00", "airport": {"code": "PUJ"}},
        "airline": {"code": "AR", "name": "Aerolineas Argentinas"},
        "legList": [],
        "fareList": fares
    })
}

fn day_payload(offers: Vec<serde_json::Value>) -> String {
    json!({
        "requestedFlightSegmentList": [
            {"type": "SEGMENT_1", "flightList": offers}
        ]
    })
    .to_string()
}

fn config(day_count: u32) -> SearchConfig {
    SearchConfig {
        origin: "EZE".to_string(),
        destination: "PUJ".to_string(),
        departure_start: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
        return_start: NaiveDate::from_ymd_opt(2026, 9, 20).unwrap(),
        day_count,
        fare_class: "SMILES_CLUB".to_string(),
        max_concurrency: 2,
    }
}

#[tokio::test]
async fn two_day_window_reports_per_day_and_global_cheapest() {
    let source = ScriptedSource::new(vec![
        ("2026-09-10", day_payload(vec![offer("ob-day1", Some(15000))])),
        ("2026-09-11", day_payload(vec![offer("ob-day2", Some(12000))])),
        ("2026-09-20", day_payload(vec![offer("ib-day1", Some(30000))])),
        ("2026-09-21", day_payload(vec![offer("ib-day2", Some(31000))])),
    ]);
    let engine = SweepEngine::new(config(2), FareClient::new(source.clone()));

    let report = engine.run().await.expect("sweep succeeds");

    let outbound = &report.outbound;
    assert_eq!(outbound.days.len(), 2);
    assert!(outbound.failures.is_empty());
    assert_eq!(
        outbound.days[0].query_date(),
        NaiveDate::from_ymd_opt(2026, 9, 10).unwrap()
    );
    assert_eq!(outbound.days[0].cheapest.as_ref().unwrap().miles(), 15000);
    assert_eq!(outbound.days[1].cheapest.as_ref().unwrap().miles(), 12000);

    let best = outbound.best.as_ref().expect("outbound winner");
    assert_eq!(best.offer.uid, "ob-day2");
    assert_eq!(best.miles(), 12000);

    let inbound_best = report.inbound.best.as_ref().expect("inbound winner");
    assert_eq!(inbound_best.offer.uid, "ib-day1");

    // one tax request per direction winner
    assert_eq!(source.tax_calls.load(Ordering::SeqCst), 2);
    assert_eq!(outbound.tax.unwrap().money(), 84.3);
    assert_eq!(source.search_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn single_day_overall_equals_per_day_cheapest() {
    let source = ScriptedSource::new(vec![
        ("2026-09-10", day_payload(vec![offer("ob", Some(21000))])),
        ("2026-09-20", day_payload(vec![offer("ib", Some(22000))])),
    ]);
    let engine = SweepEngine::new(config(1), FareClient::new(source));

    let report = engine.run().await.expect("sweep succeeds");

    assert_eq!(report.outbound.days.len(), 1);
    assert_eq!(
        report.outbound.best.as_ref().unwrap(),
        report.outbound.days[0].cheapest.as_ref().unwrap()
    );
    assert_eq!(report.outbound.best.as_ref().unwrap().miles(), 21000);
}

#[tokio::test]
async fn window_without_target_class_finds_no_itinerary_and_skips_tax() {
    let source = ScriptedSource::new(vec![
        ("2026-09-10", day_payload(vec![offer("ob1", None)])),
        ("2026-09-11", day_payload(vec![offer("ob2", None)])),
        ("2026-09-20", day_payload(vec![offer("ib1", None)])),
        ("2026-09-21", day_payload(vec![offer("ib2", None)])),
    ]);
    let engine = SweepEngine::new(config(2), FareClient::new(source.clone()));

    let report = engine.run().await.expect("sweep still succeeds");

    assert!(report.outbound.best.is_none());
    assert!(report.inbound.best.is_none());
    assert!(report.outbound.tax.is_none());
    assert_eq!(source.tax_calls.load(Ordering::SeqCst), 0);
    // the days themselves were collected fine
    assert_eq!(report.outbound.days.len(), 2);
    assert!(report.outbound.failures.is_empty());
}

#[tokio::test]
async fn classless_day_never_beats_a_priced_day() {
    let source = ScriptedSource::new(vec![
        ("2026-09-10", day_payload(vec![offer("priced", Some(15000))])),
        ("2026-09-11", day_payload(vec![offer("classless", None)])),
        ("2026-09-20", day_payload(vec![offer("ib1", Some(40000))])),
        ("2026-09-21", day_payload(vec![offer("ib2", Some(39000))])),
    ]);
    let engine = SweepEngine::new(config(2), FareClient::new(source));

    let report = engine.run().await.expect("sweep succeeds");

    let outbound = &report.outbound;
    assert_eq!(outbound.days.len(), 2);
    assert!(outbound.days[1].cheapest.is_none());
    assert_eq!(outbound.best.as_ref().unwrap().offer.uid, "priced");
}

#[tokio::test]
async fn one_failed_day_yields_a_partial_report() {
    // 2026-09-11 has no scripted body, so its query comes back empty
    let source = ScriptedSource::new(vec![
        ("2026-09-10", day_payload(vec![offer("ob1", Some(15000))])),
        ("2026-09-20", day_payload(vec![offer("ib1", Some(30000))])),
        ("2026-09-21", day_payload(vec![offer("ib2", Some(29000))])),
    ]);
    let engine = SweepEngine::new(config(2), FareClient::new(source));

    let report = engine.run().await.expect("partial sweep still succeeds");

    let outbound = &report.outbound;
    assert!(outbound.is_partial());
    assert_eq!(outbound.days.len(), 1);
    assert_eq!(outbound.failures.len(), 1);
    assert_eq!(
        outbound.failures[0].query_date,
        NaiveDate::from_ymd_opt(2026, 9, 11).unwrap()
    );
    assert!(matches!(
        outbound.failures[0].error,
        FetchError::EmptyBody { .. }
    ));
    assert_eq!(outbound.best.as_ref().unwrap().miles(), 15000);

    assert!(!report.inbound.is_partial());
    assert_eq!(report.inbound.best.as_ref().unwrap().miles(), 29000);
}
