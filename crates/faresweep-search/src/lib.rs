//! Concurrent multi-day sweep: fan out one fare query per (date,
//! direction) pair, collect the per-day results, and reduce them to the
//! cheapest itinerary per direction.
//!
//! Failures are isolated per task: a day whose query dies is recorded
//! as a failed date and the rest of the window still produces a report.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Days, NaiveDate};
use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::warn;
use uuid::Uuid;

use faresweep_client::{FareClient, FetchError};
use faresweep_core::{cheapest_of_day, cheapest_overall, BoardingTax, DayResult, FarePick};

/// In-flight request cap when the boundary does not choose one.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Immutable sweep parameters, validated at the boundary and never
/// re-validated here.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub origin: String,
    pub destination: String,
    pub departure_start: NaiveDate,
    pub return_start: NaiveDate,
    pub day_count: u32,
    pub fare_class: String,
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Outbound => "outbound",
            Direction::Inbound => "inbound",
        }
    }
}

/// One fare query to run: the requested date plus the route, with the
/// airports swapped for the inbound direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTask {
    pub direction: Direction,
    pub query_date: NaiveDate,
    pub origin: String,
    pub destination: String,
}

/// All `2 × day_count` tasks of a sweep, outbound first.
pub fn plan_tasks(config: &SearchConfig) -> Vec<QueryTask> {
    let mut tasks = Vec::with_capacity(config.day_count as usize * 2);
    tasks.extend(plan_direction(config, Direction::Outbound));
    tasks.extend(plan_direction(config, Direction::Inbound));
    tasks
}

pub fn plan_direction(config: &SearchConfig, direction: Direction) -> Vec<QueryTask> {
    let (start, origin, destination) = match direction {
        Direction::Outbound => (config.departure_start, &config.origin, &config.destination),
        Direction::Inbound => (config.return_start, &config.destination, &config.origin),
    };
    (0..config.day_count)
        .map(|offset| QueryTask {
            direction,
            query_date: start + Days::new(u64::from(offset)),
            origin: origin.clone(),
            destination: destination.clone(),
        })
        .collect()
}

/// A day whose query could not produce a result.
#[derive(Debug)]
pub struct FailedQuery {
    pub query_date: NaiveDate,
    pub origin: String,
    pub destination: String,
    pub error: FetchError,
}

/// One collected day: the full result for optional listing plus the
/// day's cheapest pick under the target fare class.
#[derive(Debug, Clone)]
pub struct DayReport {
    pub result: DayResult,
    pub cheapest: Option<FarePick>,
}

impl DayReport {
    pub fn query_date(&self) -> NaiveDate {
        self.result.query_date
    }
}

#[derive(Debug)]
pub struct DirectionReport {
    pub direction: Direction,
    /// Successful days, sorted ascending by query date.
    pub days: Vec<DayReport>,
    /// Failed dates, sorted ascending by query date.
    pub failures: Vec<FailedQuery>,
    /// Globally cheapest pick of the window, `None` when no offer in
    /// the window carried the target fare class.
    pub best: Option<FarePick>,
    /// Boarding tax for `best`; only fetched when `best` is present.
    pub tax: Option<BoardingTax>,
}

impl DirectionReport {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[derive(Debug)]
pub struct SweepReport {
    pub run_id: Uuid,
    pub elapsed: Duration,
    pub outbound: DirectionReport,
    pub inbound: DirectionReport,
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("fetching boarding tax for offer {offer_uid}: {source}")]
    BoardingTax {
        offer_uid: String,
        #[source]
        source: FetchError,
    },
}

/// Runs a whole sweep: scheduling, bounded fan-out, collection,
/// reduction, and boarding-tax enrichment of each direction's winner.
pub struct SweepEngine {
    config: SearchConfig,
    client: FareClient,
    gate: Arc<Semaphore>,
}

impl SweepEngine {
    pub fn new(config: SearchConfig, client: FareClient) -> Self {
        let gate = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Self {
            config,
            client,
            gate,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<SweepReport, SweepError> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();

        let (mut outbound, mut inbound) = tokio::join!(
            self.run_direction(run_id, Direction::Outbound),
            self.run_direction(run_id, Direction::Inbound),
        );

        self.enrich_with_tax(run_id, &mut outbound).await?;
        self.enrich_with_tax(run_id, &mut inbound).await?;

        Ok(SweepReport {
            run_id,
            elapsed: started.elapsed(),
            outbound,
            inbound,
        })
    }

    async fn run_direction(&self, run_id: Uuid, direction: Direction) -> DirectionReport {
        let tasks = plan_direction(&self.config, direction);

        // capacity equals the producer count, so no send ever blocks
        let (tx, mut rx) = mpsc::channel(tasks.len().max(1));
        let mut in_flight = JoinSet::new();
        for task in tasks {
            let tx = tx.clone();
            let client = self.client.clone();
            let gate = Arc::clone(&self.gate);
            in_flight.spawn(async move {
                let _permit = gate.acquire_owned().await.expect("semaphore not closed");
                let outcome = client
                    .search(run_id, task.query_date, &task.origin, &task.destination)
                    .await;
                let _ = tx.send((task, outcome)).await;
            });
        }
        drop(tx);

        // barrier: every task of this direction has finished before the
        // channel is drained
        while let Some(joined) = in_flight.join_next().await {
            if let Err(err) = joined {
                warn!(direction = direction.label(), %err, "query task aborted");
            }
        }

        let mut results = Vec::new();
        let mut failures = Vec::new();
        while let Some((task, outcome)) = rx.recv().await {
            match outcome {
                Ok(result) => results.push(result),
                Err(error) => {
                    warn!(
                        direction = direction.label(),
                        date = %task.query_date,
                        %error,
                        "query failed; continuing with the remaining days"
                    );
                    failures.push(FailedQuery {
                        query_date: task.query_date,
                        origin: task.origin,
                        destination: task.destination,
                        error,
                    });
                }
            }
        }
        results.sort_by_key(|result| result.query_date);
        failures.sort_by_key(|failure| failure.query_date);

        let days: Vec<DayReport> = results
            .into_iter()
            .map(|result| {
                let cheapest = cheapest_of_day(&result.segment.offers, &self.config.fare_class);
                DayReport { result, cheapest }
            })
            .collect();
        let best = cheapest_overall(days.iter().filter_map(|day| day.cheapest.as_ref())).cloned();

        DirectionReport {
            direction,
            days,
            failures,
            best,
            tax: None,
        }
    }

    async fn enrich_with_tax(
        &self,
        run_id: Uuid,
        report: &mut DirectionReport,
    ) -> Result<(), SweepError> {
        let Some(best) = &report.best else {
            return Ok(());
        };
        let tax = self
            .client
            .boarding_tax(run_id, &best.offer.uid, &best.fare.uid)
            .await
            .map_err(|source| SweepError::BoardingTax {
                offer_uid: best.offer.uid.clone(),
                source,
            })?;
        report.tax = Some(tax);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(day_count: u32) -> SearchConfig {
        SearchConfig {
            origin: "EZE".to_string(),
            destination: "PUJ".to_string(),
            departure_start: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
            return_start: NaiveDate::from_ymd_opt(2026, 9, 20).unwrap(),
            day_count,
            fare_class: "SMILES_CLUB".to_string(),
            max_concurrency: DEFAULT_CONCURRENCY,
        }
    }

    #[test]
    fn plans_two_tasks_per_day() {
        for day_count in 1..=10 {
            let tasks = plan_tasks(&config(day_count));
            assert_eq!(tasks.len(), day_count as usize * 2);
            let outbound = tasks
                .iter()
                .filter(|t| t.direction == Direction::Outbound)
                .count();
            assert_eq!(outbound, day_count as usize);
        }
    }

    #[test]
    fn direction_dates_are_consecutive_and_distinct() {
        let tasks = plan_direction(&config(5), Direction::Outbound);
        let start = NaiveDate::from_ymd_opt(2026, 9, 10).unwrap();
        for (offset, task) in tasks.iter().enumerate() {
            assert_eq!(task.query_date, start + Days::new(offset as u64));
        }
        for pair in tasks.windows(2) {
            assert!(pair[0].query_date < pair[1].query_date);
        }
    }

    #[test]
    fn inbound_swaps_airports_and_uses_return_start() {
        let tasks = plan_direction(&config(3), Direction::Inbound);
        assert_eq!(tasks[0].origin, "PUJ");
        assert_eq!(tasks[0].destination, "EZE");
        assert_eq!(
            tasks[0].query_date,
            NaiveDate::from_ymd_opt(2026, 9, 20).unwrap()
        );
    }

    #[test]
    fn single_day_window_plans_one_task_per_direction() {
        let tasks = plan_tasks(&config(1));
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].direction, Direction::Outbound);
        assert_eq!(tasks[1].direction, Direction::Inbound);
    }
}
