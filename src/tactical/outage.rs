//! Network outage analysis.
//!
//! A down or unreachable host is a root cause when at least one of its
//! parents is still reachable (or it has no parents at all). Every root
//! cause is reported together with the number of hosts sitting behind it.

use crate::access::{Authorizer, StatusLookup};
use crate::model::{Host, HostState, HostStatus};

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Outage analysis error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutageError {
    #[error("cyclic host topology detected at host {host}")]
    CyclicTopology { host: String },
    #[error("host not found in topology: {0}")]
    UnknownHost(String),
}

/// Host population with a precomputed parent to children index.
#[derive(Debug, Clone)]
pub struct HostTopology<'a> {
    hosts: &'a [Host],
    index: HashMap<&'a str, usize>,
    children: Vec<Vec<usize>>,
}

impl<'a> HostTopology<'a> {
    /// Index `hosts`. Children keep the order of the host list; a host
    /// naming the same parent twice is still one child.
    pub fn new(hosts: &'a [Host]) -> Self {
        let mut index = HashMap::with_capacity(hosts.len());
        for (i, host) in hosts.iter().enumerate() {
            index.entry(host.name.as_str()).or_insert(i);
        }

        let mut children = vec![Vec::new(); hosts.len()];
        for (i, host) in hosts.iter().enumerate() {
            for (n, parent) in host.parents.iter().enumerate() {
                if host.parents[..n].contains(parent) {
                    continue;
                }
                if let Some(&p) = index.get(parent.as_str()) {
                    children[p].push(i);
                }
            }
        }

        Self {
            hosts,
            index,
            children,
        }
    }

    pub fn get(&self, name: &str) -> Option<&'a Host> {
        self.index.get(name).map(|&i| &self.hosts[i])
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Immediate children of `name`, in host list order.
    pub fn children_of(&self, name: &str) -> Vec<&'a Host> {
        match self.index.get(name) {
            Some(&i) => self.children[i].iter().map(|&c| &self.hosts[c]).collect(),
            None => Vec::new(),
        }
    }

    /// The host itself plus every host behind it, whatever their state.
    ///
    /// A host reachable along several paths is counted once per path.
    pub fn count_affected_hosts(&self, name: &str) -> Result<usize, OutageError> {
        let root = *self
            .index
            .get(name)
            .ok_or_else(|| OutageError::UnknownHost(name.to_string()))?;
        let mut marks = vec![Mark::Unvisited; self.hosts.len()];
        self.count_from(root, &mut marks)
    }

    /// Depth-first post-order sum. `marks` memoizes finished subtrees
    /// across calls and catches back edges.
    fn count_from(&self, root: usize, marks: &mut [Mark]) -> Result<usize, OutageError> {
        if let Mark::Done(n) = marks[root] {
            return Ok(n);
        }

        marks[root] = Mark::InProgress;
        let mut stack = vec![(root, 0usize)];

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            if let Some(&child) = self.children[node].get(frame.1) {
                frame.1 += 1;
                match marks[child] {
                    Mark::Done(_) => {}
                    Mark::InProgress => {
                        return Err(OutageError::CyclicTopology {
                            host: self.hosts[child].name.clone(),
                        });
                    }
                    Mark::Unvisited => {
                        marks[child] = Mark::InProgress;
                        stack.push((child, 0));
                    }
                }
                continue;
            }

            let total = self.children[node]
                .iter()
                .map(|&c| match marks[c] {
                    Mark::Done(n) => n,
                    _ => 0,
                })
                .fold(1usize, usize::saturating_add);
            marks[node] = Mark::Done(total);
            stack.pop();
            if node == root {
                return Ok(total);
            }
        }

        unreachable!("root frame is always popped last")
    }
}

#[derive(Debug, Clone, Copy)]
enum Mark {
    Unvisited,
    InProgress,
    Done(usize),
}

/// True when every parent of `host` is down, unreachable, or unknown.
///
/// Only looks one level up. A host without parents is never blocked.
pub fn is_route_blocked<L>(host: &Host, lookup: &L) -> bool
where
    L: StatusLookup + ?Sized,
{
    if !host.has_parents() {
        return false;
    }

    for parent in &host.parents {
        if let Some(HostState::Up | HostState::Pending) = lookup.host_state(parent) {
            return false;
        }
    }

    true
}

/// One root-cause host and its blast radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutageRecord<'a> {
    pub host: &'a Host,
    /// Includes the host itself.
    pub affected_child_hosts: usize,
}

impl OutageRecord<'_> {
    /// The outage takes other hosts down with it.
    pub fn is_blocking(&self) -> bool {
        self.affected_child_hosts > 1
    }
}

/// Result of one outage analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutageReport<'a> {
    pub outages: Vec<OutageRecord<'a>>,
    pub total_blocking_outages: usize,
    pub total_nonblocking_outages: usize,
}

impl<'a> OutageReport<'a> {
    pub fn blocking(&self) -> impl Iterator<Item = &OutageRecord<'a>> {
        self.outages.iter().filter(|o| o.is_blocking())
    }

    pub fn nonblocking(&self) -> impl Iterator<Item = &OutageRecord<'a>> {
        self.outages.iter().filter(|o| !o.is_blocking())
    }
}

/// Finds root-cause hosts among the current host statuses.
pub struct OutageAnalyzer<'a, A: ?Sized, L: ?Sized> {
    authorizer: &'a A,
    lookup: &'a L,
}

impl<'a, A, L> OutageAnalyzer<'a, A, L>
where
    A: Authorizer + ?Sized,
    L: StatusLookup + ?Sized,
{
    pub fn new(authorizer: &'a A, lookup: &'a L) -> Self {
        Self { authorizer, lookup }
    }

    pub fn is_route_blocked(&self, host: &Host) -> bool {
        is_route_blocked(host, self.lookup)
    }

    /// Report every visible, unblocked down or unreachable host in
    /// `host_statuses` order.
    pub fn find_outages<'t>(
        &self,
        host_statuses: &[HostStatus],
        topology: &HostTopology<'t>,
    ) -> Result<OutageReport<'t>, OutageError> {
        let mut roots: Vec<&'t Host> = Vec::new();

        for status in host_statuses {
            if !status.state.is_problem() {
                continue;
            }

            let host = match topology.get(&status.host_name) {
                Some(h) => h,
                None => {
                    tracing::debug!("Outages: no host object for {}", status.host_name);
                    continue;
                }
            };
            if !self.authorizer.is_authorized_for_host(&host.name) {
                continue;
            }
            if self.is_route_blocked(host) {
                tracing::trace!("Outages: {} is blocked by its parents", host.name);
                continue;
            }

            roots.push(host);
        }

        let mut marks = vec![Mark::Unvisited; topology.len()];
        let mut report = OutageReport::default();

        for host in roots {
            let idx = topology.index[host.name.as_str()];
            let affected = topology.count_from(idx, &mut marks).map_err(|e| {
                tracing::warn!("Outages: giving up on {}: {}", host.name, e);
                e
            })?;

            let record = OutageRecord {
                host,
                affected_child_hosts: affected,
            };
            if record.is_blocking() {
                report.total_blocking_outages += 1;
            } else {
                report.total_nonblocking_outages += 1;
            }
            report.outages.push(record);
        }

        tracing::debug!(
            "Outages: {} blocking, {} non-blocking",
            report.total_blocking_outages,
            report.total_nonblocking_outages
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AllowAll, HostAllowList, HostStatusIndex};

    fn analyze<'t>(
        hosts: &'t [Host],
        statuses: &[HostStatus],
    ) -> Result<OutageReport<'t>, OutageError> {
        let topology = HostTopology::new(hosts);
        let index = HostStatusIndex::new(statuses);
        OutageAnalyzer::new(&AllowAll, &index).find_outages(statuses, &topology)
    }

    #[test]
    fn test_host_without_parents_never_blocked() {
        let index = HostStatusIndex::new(&[]);
        assert!(!is_route_blocked(&Host::new("core"), &index));
    }

    #[test]
    fn test_blocked_route_chain() {
        let hosts = vec![
            Host::new("c"),
            Host::with_parents("b", &["c"]),
            Host::with_parents("a", &["b"]),
        ];
        let statuses = vec![
            HostStatus::new("c", HostState::Up),
            HostStatus::new("b", HostState::Down),
            HostStatus::new("a", HostState::Down),
        ];
        let index = HostStatusIndex::new(&statuses);

        assert!(is_route_blocked(&hosts[2], &index));
        assert!(!is_route_blocked(&hosts[1], &index));

        let report = analyze(&hosts, &statuses).unwrap();
        assert_eq!(report.outages.len(), 1);
        assert_eq!(report.outages[0].host.name, "b");
        assert_eq!(report.outages[0].affected_child_hosts, 2);
    }

    #[test]
    fn test_one_healthy_parent_unblocks() {
        let host = Host::with_parents("a", &["p1", "p2", "p3"]);

        let index = HostStatusIndex::new(&[
            HostStatus::new("p1", HostState::Down),
            HostStatus::new("p2", HostState::Pending),
            HostStatus::new("p3", HostState::Unreachable),
        ]);
        assert!(!is_route_blocked(&host, &index));

        // p3 has no status record at all
        let index = HostStatusIndex::new(&[
            HostStatus::new("p1", HostState::Down),
            HostStatus::new("p2", HostState::Unreachable),
        ]);
        assert!(is_route_blocked(&host, &index));
    }

    #[test]
    fn test_count_affected_hosts_ignores_state() {
        let hosts = vec![
            Host::new("r"),
            Host::with_parents("x", &["r"]),
            Host::with_parents("y", &["r"]),
            Host::with_parents("z", &["y"]),
            Host::new("other"),
        ];
        let topology = HostTopology::new(&hosts);

        assert_eq!(topology.count_affected_hosts("r").unwrap(), 4);
        assert_eq!(topology.count_affected_hosts("y").unwrap(), 2);
        assert_eq!(topology.count_affected_hosts("other").unwrap(), 1);
        assert_eq!(
            topology.count_affected_hosts("missing"),
            Err(OutageError::UnknownHost("missing".to_string()))
        );
    }

    #[test]
    fn test_diamond_counts_each_path() {
        let hosts = vec![
            Host::new("r"),
            Host::with_parents("a", &["r"]),
            Host::with_parents("b", &["r"]),
            Host::with_parents("leaf", &["a", "b"]),
        ];
        let topology = HostTopology::new(&hosts);

        // r + a + leaf + b + leaf
        assert_eq!(topology.count_affected_hosts("r").unwrap(), 5);
    }

    #[test]
    fn test_count_returns_root_total() {
        let hosts = vec![
            Host::new("r"),
            Host::with_parents("a", &["r"]),
            Host::with_parents("b", &["a"]),
            Host::with_parents("c", &["a"]),
        ];
        let topology = HostTopology::new(&hosts);

        assert_eq!(topology.count_affected_hosts("c").unwrap(), 1);
        assert_eq!(topology.count_affected_hosts("a").unwrap(), 3);
        assert_eq!(topology.count_affected_hosts("r").unwrap(), 4);

        // a subtree finished earlier is reused as-is
        let mut marks = vec![Mark::Unvisited; hosts.len()];
        assert_eq!(topology.count_from(1, &mut marks).unwrap(), 3);
        assert_eq!(topology.count_from(0, &mut marks).unwrap(), 4);
        assert_eq!(topology.count_from(1, &mut marks).unwrap(), 3);
    }

    #[test]
    fn test_duplicate_parent_is_one_child() {
        let hosts = vec![Host::new("r"), Host::with_parents("a", &["r", "r"])];
        let topology = HostTopology::new(&hosts);

        assert_eq!(topology.children_of("r").len(), 1);
        assert_eq!(topology.count_affected_hosts("r").unwrap(), 2);
    }

    #[test]
    fn test_cycle_fails_fast() {
        let hosts = vec![
            Host::with_parents("a", &["c"]),
            Host::with_parents("b", &["a"]),
            Host::with_parents("c", &["b"]),
        ];
        let topology = HostTopology::new(&hosts);

        assert!(matches!(
            topology.count_affected_hosts("a"),
            Err(OutageError::CyclicTopology { .. })
        ));

        let selfish = vec![Host::with_parents("loop", &["loop"])];
        let topology = HostTopology::new(&selfish);
        assert_eq!(
            topology.count_affected_hosts("loop"),
            Err(OutageError::CyclicTopology {
                host: "loop".to_string()
            })
        );
    }

    #[test]
    fn test_end_to_end_core_outage() {
        let hosts = vec![
            Host::new("core"),
            Host::with_parents("edge1", &["core"]),
            Host::with_parents("edge2", &["core"]),
        ];
        let statuses = vec![
            HostStatus::new("core", HostState::Down),
            HostStatus::new("edge1", HostState::Down),
            HostStatus::new("edge2", HostState::Up),
        ];

        let report = analyze(&hosts, &statuses).unwrap();
        assert_eq!(report.outages.len(), 1);
        assert_eq!(report.outages[0].host.name, "core");
        assert_eq!(report.outages[0].affected_child_hosts, 3);
        assert_eq!(report.total_blocking_outages, 1);
        assert_eq!(report.total_nonblocking_outages, 0);
        assert_eq!(report.blocking().count(), 1);
    }

    #[test]
    fn test_nonblocking_and_unknown_hosts() {
        let hosts = vec![Host::new("lonely"), Host::new("up")];
        let statuses = vec![
            HostStatus::new("lonely", HostState::Unreachable),
            HostStatus::new("ghost", HostState::Down),
            HostStatus::new("up", HostState::Up),
        ];

        let report = analyze(&hosts, &statuses).unwrap();
        assert_eq!(report.outages.len(), 1);
        assert_eq!(report.total_nonblocking_outages, 1);
        assert_eq!(report.nonblocking().next().unwrap().host.name, "lonely");
    }

    #[test]
    fn test_unauthorized_root_not_reported() {
        let hosts = vec![Host::new("secret")];
        let statuses = vec![HostStatus::new("secret", HostState::Down)];
        let topology = HostTopology::new(&hosts);
        let index = HostStatusIndex::new(&statuses);
        let auth = HostAllowList::new(Vec::<String>::new());

        let report = OutageAnalyzer::new(&auth, &index)
            .find_outages(&statuses, &topology)
            .unwrap();
        assert!(report.outages.is_empty());
        assert_eq!(report.total_blocking_outages + report.total_nonblocking_outages, 0);
    }
}
