//! Status snapshots exported by the monitoring core.
//!
//! A snapshot is one consistent read of the object list and the status
//! lists. The analysis passes treat it as immutable.

use crate::access::{HostStatusIndex, StatusLookup};
use crate::model::{Host, HostState, HostStatus, ServiceStatus};
use crate::tactical::HostTopology;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Snapshot loading error types.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("host defined twice: {0}")]
    DuplicateHost(String),
    #[error("host status reported twice: {0}")]
    DuplicateHostStatus(String),
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    created: Option<DateTime<Utc>>,
    #[serde(default)]
    hosts: Vec<Host>,
    #[serde(default)]
    host_status: Vec<HostStatus>,
    #[serde(default)]
    service_status: Vec<ServiceStatus>,
}

/// Hosts plus current host and service status.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub created: Option<DateTime<Utc>>,
    pub hosts: Vec<Host>,
    pub host_status: Vec<HostStatus>,
    pub service_status: Vec<ServiceStatus>,
    index: HostStatusIndex,
}

impl Snapshot {
    pub fn new(
        hosts: Vec<Host>,
        host_status: Vec<HostStatus>,
        service_status: Vec<ServiceStatus>,
    ) -> Result<Self, SnapshotError> {
        let mut seen = HashSet::with_capacity(hosts.len());
        for host in &hosts {
            if !seen.insert(host.name.as_str()) {
                return Err(SnapshotError::DuplicateHost(host.name.clone()));
            }
        }

        let mut reported = HashSet::with_capacity(host_status.len());
        for status in &host_status {
            if !reported.insert(status.host_name.as_str()) {
                return Err(SnapshotError::DuplicateHostStatus(status.host_name.clone()));
            }
        }

        let index = HostStatusIndex::new(&host_status);
        Ok(Self {
            created: None,
            hosts,
            host_status,
            service_status,
            index,
        })
    }

    /// Parse a JSON snapshot document.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let raw: RawSnapshot = serde_json::from_str(json)?;
        let mut snapshot = Self::new(raw.hosts, raw.host_status, raw.service_status)?;
        snapshot.created = raw.created;
        Ok(snapshot)
    }

    /// Read and parse a JSON snapshot file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json(&content)?;
        tracing::debug!(
            "Loaded snapshot with {} hosts, {} host statuses, {} service statuses",
            snapshot.hosts.len(),
            snapshot.host_status.len(),
            snapshot.service_status.len()
        );
        Ok(snapshot)
    }

    pub fn topology(&self) -> HostTopology<'_> {
        HostTopology::new(&self.hosts)
    }
}

impl StatusLookup for Snapshot {
    fn host_state(&self, host_name: &str) -> Option<HostState> {
        self.index.host_state(host_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "created": "2026-10-17T08:00:00Z",
        "hosts": [
            {"name": "core"},
            {"name": "edge1", "parents": ["core"]}
        ],
        "host_status": [
            {"host_name": "core", "state": "down"},
            {"host_name": "edge1", "state": "unreachable", "state_type": "soft"}
        ],
        "service_status": [
            {"host_name": "edge1", "description": "PING", "state": "critical",
             "checks_enabled": false, "latency": 0.2}
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let snapshot = Snapshot::from_json(SAMPLE).unwrap();

        assert!(snapshot.created.is_some());
        assert_eq!(snapshot.hosts.len(), 2);
        assert_eq!(snapshot.hosts[1].parents, vec!["core".to_string()]);
        assert_eq!(snapshot.host_state("core"), Some(HostState::Down));
        assert!(snapshot.is_host_down("edge1"));
        assert!(!snapshot.service_status[0].checks_enabled);
        assert_eq!(snapshot.topology().children_of("core").len(), 1);
    }

    #[test]
    fn test_load_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(SAMPLE.as_bytes()).unwrap();

        let snapshot = Snapshot::load(tmp.path()).unwrap();
        assert_eq!(snapshot.host_status.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = Snapshot::load("/nonexistent/status-snapshot.json").unwrap_err();
        assert!(matches!(err, SnapshotError::Io(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = Snapshot::from_json(r#"{"hosts": [{"parents": []}]}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::Parse(_)));
    }

    #[test]
    fn test_duplicate_host() {
        let err = Snapshot::from_json(r#"{"hosts": [{"name": "a"}, {"name": "a"}]}"#)
            .unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateHost(ref h) if h == "a"));
    }

    #[test]
    fn test_duplicate_host_status() {
        let json = r#"{
            "hosts": [{"name": "core"}],
            "host_status": [
                {"host_name": "core", "state": "down"},
                {"host_name": "core", "state": "up"}
            ]
        }"#;

        let err = Snapshot::from_json(json).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateHostStatus(ref h) if h == "core"));
    }
}
