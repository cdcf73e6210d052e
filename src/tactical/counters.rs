//! Dimensional status counters.
//!
//! Each status record lands in exactly one cell keyed by its full
//! classification. Every coarser figure the overview shows (all critical
//! services, all acknowledged critical services, ...) is a sum over cells,
//! so the breakdowns always partition their totals.

use crate::model::{CheckMode, HostState, ServiceState};

use serde::Serialize;
use std::collections::BTreeMap;

/// How a problem state is being dealt with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemHandling {
    Scheduled,
    Acknowledged,
    Unacknowledged,
}

impl ProblemHandling {
    pub const ALL: [ProblemHandling; 3] = [
        ProblemHandling::Scheduled,
        ProblemHandling::Acknowledged,
        ProblemHandling::Unacknowledged,
    ];

    /// Scheduled downtime takes priority over acknowledgement.
    pub fn classify(scheduled_downtime_depth: u32, acknowledged: bool) -> Self {
        if scheduled_downtime_depth > 0 {
            ProblemHandling::Scheduled
        } else if acknowledged {
            ProblemHandling::Acknowledged
        } else {
            ProblemHandling::Unacknowledged
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProblemHandling::Scheduled => "scheduled",
            ProblemHandling::Acknowledged => "acknowledged",
            ProblemHandling::Unacknowledged => "unacknowledged",
        }
    }
}

/// Full classification of one service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceKey {
    pub state: ServiceState,
    pub check_mode: CheckMode,
    /// Only set for warning, unknown and critical.
    pub handling: Option<ProblemHandling>,
    /// The owning host is down or unreachable.
    pub host_down: bool,
}

/// Full classification of one host status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostKey {
    pub state: HostState,
    pub check_mode: CheckMode,
    /// Only set for down and unreachable.
    pub handling: Option<ProblemHandling>,
}

/// Partial match over a [`ServiceKey`]; unset fields match anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceQuery {
    pub state: Option<ServiceState>,
    pub check_mode: Option<CheckMode>,
    pub handling: Option<ProblemHandling>,
    pub host_down: Option<bool>,
}

impl ServiceQuery {
    pub fn state(state: ServiceState) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }

    pub fn check_mode(mut self, mode: CheckMode) -> Self {
        self.check_mode = Some(mode);
        self
    }

    pub fn handling(mut self, handling: ProblemHandling) -> Self {
        self.handling = Some(handling);
        self
    }

    pub fn host_down(mut self, host_down: bool) -> Self {
        self.host_down = Some(host_down);
        self
    }

    pub fn matches(&self, key: &ServiceKey) -> bool {
        self.state.map_or(true, |s| s == key.state)
            && self.check_mode.map_or(true, |m| m == key.check_mode)
            && self.handling.map_or(true, |h| Some(h) == key.handling)
            && self.host_down.map_or(true, |d| d == key.host_down)
    }
}

/// Partial match over a [`HostKey`]; unset fields match anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostQuery {
    pub state: Option<HostState>,
    pub check_mode: Option<CheckMode>,
    pub handling: Option<ProblemHandling>,
}

impl HostQuery {
    pub fn state(state: HostState) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }

    pub fn check_mode(mut self, mode: CheckMode) -> Self {
        self.check_mode = Some(mode);
        self
    }

    pub fn handling(mut self, handling: ProblemHandling) -> Self {
        self.handling = Some(handling);
        self
    }

    pub fn matches(&self, key: &HostKey) -> bool {
        self.state.map_or(true, |s| s == key.state)
            && self.check_mode.map_or(true, |m| m == key.check_mode)
            && self.handling.map_or(true, |h| Some(h) == key.handling)
    }
}

/// Cell counts keyed by a classification tuple.
#[derive(Debug, Clone)]
pub struct CounterMap<K> {
    cells: BTreeMap<K, u64>,
}

impl<K> Default for CounterMap<K> {
    fn default() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy> CounterMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: K) {
        *self.cells.entry(key).or_insert(0) += 1;
    }

    pub fn get(&self, key: &K) -> u64 {
        self.cells.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.cells.values().sum()
    }

    pub fn sum_where<F>(&self, mut pred: F) -> u64
    where
        F: FnMut(&K) -> bool,
    {
        self.cells
            .iter()
            .filter(|(k, _)| pred(*k))
            .map(|(_, v)| *v)
            .sum()
    }
}

impl CounterMap<ServiceKey> {
    pub fn count(&self, query: ServiceQuery) -> u64 {
        self.sum_where(|k| query.matches(k))
    }

    /// Flatten into `services_<state>[_<handling>][_<mode>][_host_down]` names.
    ///
    /// Unsuffixed names count services whose host is up or pending, the
    /// `_host_down` twins count services behind a down or unreachable host.
    pub fn write_named(&self, out: &mut BTreeMap<String, u64>) {
        for state in ServiceState::ALL {
            for host_down in [false, true] {
                let suffix = if host_down { "_host_down" } else { "" };
                let base = ServiceQuery::state(state).host_down(host_down);

                out.insert(format!("services_{}{}", state, suffix), self.count(base));
                for mode in CheckMode::ALL {
                    out.insert(
                        format!("services_{}_{}{}", state, mode.as_str(), suffix),
                        self.count(base.check_mode(mode)),
                    );
                }

                if !state.is_problem() {
                    continue;
                }

                for handling in ProblemHandling::ALL {
                    let handled = base.handling(handling);
                    out.insert(
                        format!("services_{}_{}{}", state, handling.as_str(), suffix),
                        self.count(handled),
                    );
                    for mode in CheckMode::ALL {
                        out.insert(
                            format!(
                                "services_{}_{}_{}{}",
                                state,
                                handling.as_str(),
                                mode.as_str(),
                                suffix
                            ),
                            self.count(handled.check_mode(mode)),
                        );
                    }
                }
            }
        }
    }
}

impl CounterMap<HostKey> {
    pub fn count(&self, query: HostQuery) -> u64 {
        self.sum_where(|k| query.matches(k))
    }

    /// Flatten into `hosts_<state>[_<handling>][_<mode>]` names.
    pub fn write_named(&self, out: &mut BTreeMap<String, u64>) {
        for state in HostState::ALL {
            let base = HostQuery::state(state);

            out.insert(format!("hosts_{}", state), self.count(base));
            for mode in CheckMode::ALL {
                out.insert(
                    format!("hosts_{}_{}", state, mode.as_str()),
                    self.count(base.check_mode(mode)),
                );
            }

            if !state.is_problem() {
                continue;
            }

            for handling in ProblemHandling::ALL {
                let handled = base.handling(handling);
                out.insert(
                    format!("hosts_{}_{}", state, handling.as_str()),
                    self.count(handled),
                );
                for mode in CheckMode::ALL {
                    out.insert(
                        format!("hosts_{}_{}_{}", state, handling.as_str(), mode.as_str()),
                        self.count(handled.check_mode(mode)),
                    );
                }
            }
        }
    }
}
