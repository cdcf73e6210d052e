//! Authorization and status lookup seams.
//!
//! The analysis passes never reach into global state; callers inject
//! visibility rules and host status lookups through these traits.

use crate::model::{HostState, HostStatus};

use std::collections::{HashMap, HashSet};

/// Decides which hosts and services the viewer may see.
pub trait Authorizer {
    fn is_authorized_for_host(&self, host_name: &str) -> bool;

    fn is_authorized_for_service(&self, host_name: &str, description: &str) -> bool;
}

/// Grants visibility of everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn is_authorized_for_host(&self, _host_name: &str) -> bool {
        true
    }

    fn is_authorized_for_service(&self, _host_name: &str, _description: &str) -> bool {
        true
    }
}

/// Grants visibility of a fixed set of hosts and all of their services.
#[derive(Debug, Clone, Default)]
pub struct HostAllowList {
    hosts: HashSet<String>,
}

impl HostAllowList {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
        }
    }
}

impl Authorizer for HostAllowList {
    fn is_authorized_for_host(&self, host_name: &str) -> bool {
        self.hosts.contains(host_name)
    }

    fn is_authorized_for_service(&self, host_name: &str, _description: &str) -> bool {
        self.hosts.contains(host_name)
    }
}

/// Looks up the current state of a host by name.
pub trait StatusLookup {
    fn host_state(&self, host_name: &str) -> Option<HostState>;

    /// True when the host is known to be down or unreachable.
    fn is_host_down(&self, host_name: &str) -> bool {
        self.host_state(host_name)
            .map(HostState::is_problem)
            .unwrap_or(false)
    }
}

/// Name to state index over a host status list.
#[derive(Debug, Clone, Default)]
pub struct HostStatusIndex {
    states: HashMap<String, HostState>,
}

impl HostStatusIndex {
    /// Index the given statuses. A later record for the same host wins;
    /// [`Snapshot`](crate::snapshot::Snapshot) rejects such lists up front.
    pub fn new(statuses: &[HostStatus]) -> Self {
        let states = statuses
            .iter()
            .map(|s| (s.host_name.clone(), s.state))
            .collect();
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl StatusLookup for HostStatusIndex {
    fn host_state(&self, host_name: &str) -> Option<HostState> {
        self.states.get(host_name).copied()
    }
}
