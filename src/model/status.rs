//! Live status records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current state of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostState {
    Up,
    Down,
    Unreachable,
    Pending,
}

impl HostState {
    pub const ALL: [HostState; 4] = [
        HostState::Up,
        HostState::Down,
        HostState::Unreachable,
        HostState::Pending,
    ];

    /// Down or unreachable.
    pub fn is_problem(self) -> bool {
        matches!(self, HostState::Down | HostState::Unreachable)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HostState::Up => "up",
            HostState::Down => "down",
            HostState::Unreachable => "unreachable",
            HostState::Pending => "pending",
        }
    }
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current state of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Ok,
    Warning,
    Unknown,
    Critical,
    Pending,
}

impl ServiceState {
    pub const ALL: [ServiceState; 5] = [
        ServiceState::Ok,
        ServiceState::Warning,
        ServiceState::Unknown,
        ServiceState::Critical,
        ServiceState::Pending,
    ];

    /// Warning, unknown or critical.
    pub fn is_problem(self) -> bool {
        matches!(
            self,
            ServiceState::Warning | ServiceState::Unknown | ServiceState::Critical
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceState::Ok => "ok",
            ServiceState::Warning => "warning",
            ServiceState::Unknown => "unknown",
            ServiceState::Critical => "critical",
            ServiceState::Pending => "pending",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the current state has been confirmed by the retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateType {
    Soft,
    #[default]
    Hard,
}

/// How a status record is kept fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMode {
    Active,
    Passive,
    Disabled,
}

impl CheckMode {
    pub const ALL: [CheckMode; 3] = [CheckMode::Active, CheckMode::Passive, CheckMode::Disabled];

    /// Active checks win over passive results; neither means disabled.
    pub fn from_flags(checks_enabled: bool, accept_passive_checks: bool) -> Self {
        if checks_enabled {
            CheckMode::Active
        } else if accept_passive_checks {
            CheckMode::Passive
        } else {
            CheckMode::Disabled
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckMode::Active => "active",
            CheckMode::Passive => "passive",
            CheckMode::Disabled => "disabled",
        }
    }
}

fn default_true() -> bool {
    true
}

/// Current status of a host as reported by the monitoring core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostStatus {
    pub host_name: String,
    pub state: HostState,
    #[serde(default)]
    pub state_type: StateType,
    #[serde(default = "default_true")]
    pub checks_enabled: bool,
    #[serde(default = "default_true")]
    pub accept_passive_checks: bool,
    #[serde(default)]
    pub scheduled_downtime_depth: u32,
    #[serde(default)]
    pub problem_acknowledged: bool,
    #[serde(default = "default_true")]
    pub flap_detection_enabled: bool,
    #[serde(default)]
    pub is_flapping: bool,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default = "default_true")]
    pub event_handler_enabled: bool,
    #[serde(default)]
    pub latency: f64,
    #[serde(default)]
    pub execution_time: f64,
    #[serde(default)]
    pub last_check: Option<DateTime<Utc>>,
}

impl Default for HostStatus {
    fn default() -> Self {
        Self {
            host_name: String::new(),
            state: HostState::Up,
            state_type: StateType::Hard,
            checks_enabled: true,
            accept_passive_checks: true,
            scheduled_downtime_depth: 0,
            problem_acknowledged: false,
            flap_detection_enabled: true,
            is_flapping: false,
            notifications_enabled: true,
            event_handler_enabled: true,
            latency: 0.0,
            execution_time: 0.0,
            last_check: None,
        }
    }
}

impl HostStatus {
    pub fn new(host_name: &str, state: HostState) -> Self {
        Self {
            host_name: host_name.to_string(),
            state,
            ..Default::default()
        }
    }

    pub fn check_mode(&self) -> CheckMode {
        CheckMode::from_flags(self.checks_enabled, self.accept_passive_checks)
    }

    pub fn in_scheduled_downtime(&self) -> bool {
        self.scheduled_downtime_depth > 0
    }
}

/// Current status of a service as reported by the monitoring core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub host_name: String,
    pub description: String,
    pub state: ServiceState,
    #[serde(default)]
    pub state_type: StateType,
    #[serde(default = "default_true")]
    pub checks_enabled: bool,
    #[serde(default = "default_true")]
    pub accept_passive_checks: bool,
    #[serde(default)]
    pub scheduled_downtime_depth: u32,
    #[serde(default)]
    pub problem_acknowledged: bool,
    #[serde(default = "default_true")]
    pub flap_detection_enabled: bool,
    #[serde(default)]
    pub is_flapping: bool,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default = "default_true")]
    pub event_handler_enabled: bool,
    #[serde(default)]
    pub latency: f64,
    #[serde(default)]
    pub execution_time: f64,
    #[serde(default)]
    pub last_check: Option<DateTime<Utc>>,
}

impl Default for ServiceStatus {
    fn default() -> Self {
        Self {
            host_name: String::new(),
            description: String::new(),
            state: ServiceState::Ok,
            state_type: StateType::Hard,
            checks_enabled: true,
            accept_passive_checks: true,
            scheduled_downtime_depth: 0,
            problem_acknowledged: false,
            flap_detection_enabled: true,
            is_flapping: false,
            notifications_enabled: true,
            event_handler_enabled: true,
            latency: 0.0,
            execution_time: 0.0,
            last_check: None,
        }
    }
}

impl ServiceStatus {
    pub fn new(host_name: &str, description: &str, state: ServiceState) -> Self {
        Self {
            host_name: host_name.to_string(),
            description: description.to_string(),
            state,
            ..Default::default()
        }
    }

    pub fn check_mode(&self) -> CheckMode {
        CheckMode::from_flags(self.checks_enabled, self.accept_passive_checks)
    }

    pub fn in_scheduled_downtime(&self) -> bool {
        self.scheduled_downtime_depth > 0
    }
}
