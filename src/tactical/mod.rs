//! Tactical overview: fleet status aggregation and outage analysis.
//!
//! The two passes are independent of each other; [`TacticalOverview`]
//! runs both over one snapshot and shapes the result for output.

mod aggregate;
mod counters;
mod outage;
mod stats;

pub use aggregate::*;
pub use counters::*;
pub use outage::*;
pub use stats::*;

use crate::access::Authorizer;
use crate::snapshot::Snapshot;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Health percentages for the overview header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSummary {
    pub percent_host_health: f64,
    pub percent_service_health: f64,
    pub unhandled_host_problems: u64,
    pub unhandled_service_problems: u64,
}

/// Check latency and execution time figures.
///
/// The `average_*` fields are the active-check means the overview header
/// shows; the series summaries carry the same means plus spread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub average_host_latency: f64,
    pub average_host_execution_time: f64,
    pub average_service_latency: f64,
    pub average_service_execution_time: f64,
    pub host_latency: SeriesSummary,
    pub host_execution_time: SeriesSummary,
    pub service_latency: SeriesSummary,
    pub service_execution_time: SeriesSummary,
}

/// Serializable form of [`AggregateCounters`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountersReport {
    pub health: HealthSummary,
    pub performance: PerformanceSummary,
    pub counters: BTreeMap<String, u64>,
}

impl From<&AggregateCounters> for CountersReport {
    fn from(c: &AggregateCounters) -> Self {
        Self {
            health: HealthSummary {
                percent_host_health: c.percent_host_health,
                percent_service_health: c.percent_service_health,
                unhandled_host_problems: c.unhandled_host_problems(),
                unhandled_service_problems: c.unhandled_service_problems(),
            },
            performance: PerformanceSummary {
                average_host_latency: c.average_host_latency,
                average_host_execution_time: c.average_host_execution_time,
                average_service_latency: c.average_service_latency,
                average_service_execution_time: c.average_service_execution_time,
                host_latency: c.host_latency.summary(),
                host_execution_time: c.host_execution_time.summary(),
                service_latency: c.service_latency.summary(),
                service_execution_time: c.service_execution_time.summary(),
            },
            counters: c.named_counters(),
        }
    }
}

/// Everything the tactical overview page shows.
#[derive(Debug, Clone, Serialize)]
pub struct TacticalOverview<'a> {
    pub generated_at: DateTime<Utc>,
    pub snapshot_created: Option<DateTime<Utc>>,
    pub hard_states_only: bool,
    #[serde(flatten)]
    pub status: CountersReport,
    pub network_outages: OutageReport<'a>,
}

impl<'a> TacticalOverview<'a> {
    pub fn build<A>(
        snapshot: &'a Snapshot,
        authorizer: &A,
        only_hard_state: bool,
    ) -> Result<Self, OutageError>
    where
        A: Authorizer + ?Sized,
    {
        let counters = StatusAggregator::new(authorizer)
            .only_hard_state(only_hard_state)
            .analyze(&snapshot.host_status, &snapshot.service_status, snapshot);

        let topology = snapshot.topology();
        let outages =
            OutageAnalyzer::new(authorizer, snapshot).find_outages(&snapshot.host_status, &topology)?;

        Ok(Self {
            generated_at: Utc::now(),
            snapshot_created: snapshot.created,
            hard_states_only: only_hard_state,
            status: CountersReport::from(&counters),
            network_outages: outages,
        })
    }
}
