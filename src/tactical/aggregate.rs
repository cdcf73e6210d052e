//! Fleet-wide status aggregation.

use super::counters::{CounterMap, HostKey, HostQuery, ProblemHandling, ServiceKey, ServiceQuery};
use super::stats::StatSeries;
use crate::access::{Authorizer, HostStatusIndex, StatusLookup};
use crate::model::{CheckMode, HostState, HostStatus, ServiceState, ServiceStatus, StateType};

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Counters for features switched off on individual objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeatureCounts {
    pub flap_detection_disabled: u64,
    pub flapping: u64,
    pub notifications_disabled: u64,
    pub event_handlers_disabled: u64,
}

impl FeatureCounts {
    fn record(
        &mut self,
        flap_detection_enabled: bool,
        is_flapping: bool,
        notifications_enabled: bool,
        event_handler_enabled: bool,
    ) {
        if !flap_detection_enabled {
            self.flap_detection_disabled += 1;
        } else if is_flapping {
            self.flapping += 1;
        }
        if !notifications_enabled {
            self.notifications_disabled += 1;
        }
        if !event_handler_enabled {
            self.event_handlers_disabled += 1;
        }
    }
}

/// Totals per check mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckTotals {
    pub active: u64,
    /// Active checks that also refuse passive results.
    pub active_passive_disabled: u64,
    pub passive: u64,
    pub disabled: u64,
}

/// Everything one aggregation pass produces.
///
/// Built fresh per pass and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct AggregateCounters {
    pub hosts: CounterMap<HostKey>,
    pub services: CounterMap<ServiceKey>,

    pub host_features: FeatureCounts,
    pub service_features: FeatureCounts,
    pub host_checks: CheckTotals,
    pub service_checks: CheckTotals,

    pub host_latency: StatSeries,
    pub host_execution_time: StatSeries,
    pub service_latency: StatSeries,
    pub service_execution_time: StatSeries,

    pub total_host_health: u64,
    pub potential_host_health: u64,
    pub total_service_health: u64,
    pub potential_service_health: u64,

    pub total_hosts: u64,
    pub total_services: u64,

    pub average_host_latency: f64,
    pub average_host_execution_time: f64,
    pub average_service_latency: f64,
    pub average_service_execution_time: f64,
    pub percent_host_health: f64,
    pub percent_service_health: f64,
}

impl AggregateCounters {
    fn record_host(&mut self, status: &HostStatus) {
        self.host_features.record(
            status.flap_detection_enabled,
            status.is_flapping,
            status.notifications_enabled,
            status.event_handler_enabled,
        );

        let check_mode = status.check_mode();
        let handling = status.state.is_problem().then(|| {
            ProblemHandling::classify(status.scheduled_downtime_depth, status.problem_acknowledged)
        });
        self.hosts.increment(HostKey {
            state: status.state,
            check_mode,
            handling,
        });

        if status.state == HostState::Up {
            self.total_host_health += 1;
        }
        if status.state != HostState::Pending {
            self.potential_host_health += 1;
        }

        match check_mode {
            CheckMode::Active => {
                self.host_checks.active += 1;
                if !status.accept_passive_checks {
                    self.host_checks.active_passive_disabled += 1;
                }
                self.host_latency.record(status.latency);
                self.host_execution_time.record(status.execution_time);
            }
            CheckMode::Passive => self.host_checks.passive += 1,
            CheckMode::Disabled => self.host_checks.disabled += 1,
        }

        self.total_hosts += 1;
    }

    fn record_service(&mut self, status: &ServiceStatus, host_down: bool) {
        self.service_features.record(
            status.flap_detection_enabled,
            status.is_flapping,
            status.notifications_enabled,
            status.event_handler_enabled,
        );

        let check_mode = status.check_mode();
        let handling = status.state.is_problem().then(|| {
            ProblemHandling::classify(status.scheduled_downtime_depth, status.problem_acknowledged)
        });
        self.services.increment(ServiceKey {
            state: status.state,
            check_mode,
            handling,
            host_down,
        });

        self.total_service_health += match status.state {
            ServiceState::Ok => 2,
            ServiceState::Warning | ServiceState::Unknown => 1,
            ServiceState::Critical | ServiceState::Pending => 0,
        };
        if status.state != ServiceState::Pending {
            self.potential_service_health += 2;
        }

        match check_mode {
            CheckMode::Active => {
                self.service_checks.active += 1;
                if !status.accept_passive_checks {
                    self.service_checks.active_passive_disabled += 1;
                }
                self.service_latency.record(status.latency);
                self.service_execution_time.record(status.execution_time);
            }
            CheckMode::Passive => self.service_checks.passive += 1,
            CheckMode::Disabled => self.service_checks.disabled += 1,
        }

        self.total_services += 1;
    }

    fn finish(&mut self) {
        self.average_host_latency = self.host_latency.average();
        self.average_host_execution_time = self.host_execution_time.average();
        self.average_service_latency = self.service_latency.average();
        self.average_service_execution_time = self.service_execution_time.average();
        self.percent_host_health = percentage(self.total_host_health, self.potential_host_health);
        self.percent_service_health =
            percentage(self.total_service_health, self.potential_service_health);
    }

    /// All hosts in `state`.
    pub fn hosts_in(&self, state: HostState) -> u64 {
        self.hosts.count(HostQuery::state(state))
    }

    /// All services in `state`, whatever their host is doing.
    pub fn services_in(&self, state: ServiceState) -> u64 {
        self.services.count(ServiceQuery::state(state))
    }

    /// Down or unreachable hosts nobody has acknowledged or scheduled downtime for.
    pub fn unhandled_host_problems(&self) -> u64 {
        self.hosts.sum_where(|k| {
            k.state.is_problem() && k.handling == Some(ProblemHandling::Unacknowledged)
        })
    }

    /// Service problems that are unacknowledged, outside downtime, and not
    /// explained by their host being down.
    pub fn unhandled_service_problems(&self) -> u64 {
        self.services.sum_where(|k| {
            k.state.is_problem()
                && k.handling == Some(ProblemHandling::Unacknowledged)
                && !k.host_down
        })
    }

    /// Flatten every counter into the classic named-counter namespace.
    pub fn named_counters(&self) -> BTreeMap<String, u64> {
        let mut out = BTreeMap::new();
        self.hosts.write_named(&mut out);
        self.services.write_named(&mut out);

        let features = [
            ("hosts", &self.host_features),
            ("services", &self.service_features),
        ];
        for (prefix, features) in features {
            out.insert(
                format!("{}_flap_detection_disabled", prefix),
                features.flap_detection_disabled,
            );
            out.insert(format!("{}_flapping", prefix), features.flapping);
            out.insert(
                format!("{}_notifications_disabled", prefix),
                features.notifications_disabled,
            );
            out.insert(
                format!("{}_event_handlers_disabled", prefix),
                features.event_handlers_disabled,
            );
        }

        let checks = [("host", &self.host_checks), ("service", &self.service_checks)];
        for (noun, checks) in checks {
            out.insert(format!("total_active_{}_checks", noun), checks.active);
            out.insert(
                format!("total_active_{}_checks_passive_disabled", noun),
                checks.active_passive_disabled,
            );
            out.insert(format!("total_passive_{}_checks", noun), checks.passive);
            out.insert(format!("total_disabled_{}_checks", noun), checks.disabled);
        }

        out.insert("total_host_health".to_string(), self.total_host_health);
        out.insert("potential_host_health".to_string(), self.potential_host_health);
        out.insert("total_service_health".to_string(), self.total_service_health);
        out.insert(
            "potential_service_health".to_string(),
            self.potential_service_health,
        );
        out.insert("total_hosts".to_string(), self.total_hosts);
        out.insert("total_services".to_string(), self.total_services);
        out
    }
}

/// 100 * achieved / potential, 0.0 when there is no potential.
fn percentage(achieved: u64, potential: u64) -> f64 {
    if potential == 0 {
        return 0.0;
    }
    achieved as f64 / potential as f64 * 100.0
}

/// Sweeps host and service status lists into [`AggregateCounters`].
pub struct StatusAggregator<'a, A: ?Sized> {
    authorizer: &'a A,
    only_hard_state: bool,
}

impl<'a, A: Authorizer + ?Sized> StatusAggregator<'a, A> {
    pub fn new(authorizer: &'a A) -> Self {
        Self {
            authorizer,
            only_hard_state: false,
        }
    }

    /// Skip records whose state is still soft.
    pub fn only_hard_state(mut self, only_hard_state: bool) -> Self {
        self.only_hard_state = only_hard_state;
        self
    }

    fn skip_state_type(&self, state_type: StateType) -> bool {
        self.only_hard_state && state_type == StateType::Soft
    }

    /// Run one pass over both lists.
    ///
    /// `lookup` answers whether a service's host is down; it is consulted
    /// at most once per distinct host name.
    pub fn analyze<L>(
        &self,
        host_statuses: &[HostStatus],
        service_statuses: &[ServiceStatus],
        lookup: &L,
    ) -> AggregateCounters
    where
        L: StatusLookup + ?Sized,
    {
        let mut counters = AggregateCounters::default();

        for status in host_statuses {
            if !self.authorizer.is_authorized_for_host(&status.host_name) {
                tracing::trace!("Aggregator: skipping unauthorized host {}", status.host_name);
                continue;
            }
            if self.skip_state_type(status.state_type) {
                continue;
            }
            counters.record_host(status);
        }

        let mut host_down: HashMap<&str, bool> = HashMap::new();
        for status in service_statuses {
            if !self
                .authorizer
                .is_authorized_for_service(&status.host_name, &status.description)
            {
                tracing::trace!(
                    "Aggregator: skipping unauthorized service {}/{}",
                    status.host_name,
                    status.description
                );
                continue;
            }
            if self.skip_state_type(status.state_type) {
                continue;
            }

            let down = *host_down
                .entry(status.host_name.as_str())
                .or_insert_with(|| lookup.is_host_down(&status.host_name));
            counters.record_service(status, down);
        }

        counters.finish();

        tracing::debug!(
            "Aggregator: counted {} hosts and {} services",
            counters.total_hosts,
            counters.total_services
        );
        counters
    }
}

/// Aggregate with host-down lookups answered from `host_statuses` itself.
pub fn analyze<A>(
    host_statuses: &[HostStatus],
    service_statuses: &[ServiceStatus],
    authorizer: &A,
    only_hard_state: bool,
) -> AggregateCounters
where
    A: Authorizer + ?Sized,
{
    let index = HostStatusIndex::new(host_statuses);
    StatusAggregator::new(authorizer)
        .only_hard_state(only_hard_state)
        .analyze(host_statuses, service_statuses, &index)
}
