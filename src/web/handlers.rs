//! HTTP request handlers.
//!
//! Every request reads its own snapshot and builds its own results, so
//! concurrent requests share nothing mutable.

use super::AppState;
use crate::snapshot::Snapshot;
use crate::tactical::{CountersReport, OutageAnalyzer, StatusAggregator, TacticalOverview};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
pub struct OverviewQuery {
    /// Overrides the configured hard-state filter.
    #[serde(default)]
    pub hard_states_only: Option<bool>,
}

impl OverviewQuery {
    fn hard_states_only(&self, state: &AppState) -> bool {
        self.hard_states_only
            .unwrap_or(state.config.hard_states_only)
    }
}

async fn load_snapshot(state: &AppState) -> Result<Snapshot, Response> {
    let path = state.config.snapshot_path.clone();

    match tokio::task::spawn_blocking(move || Snapshot::load(path)).await {
        Ok(Ok(snapshot)) => Ok(snapshot),
        Ok(Err(e)) => {
            tracing::error!("Failed to load snapshot {}: {}", state.config.snapshot_path, e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response())
        }
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()),
    }
}

pub async fn handle_health() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

pub async fn handle_tactical(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> Response {
    let snapshot = match load_snapshot(&state).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let hard_only = query.hard_states_only(&state);
    match TacticalOverview::build(&snapshot, state.authorizer.as_ref(), hard_only) {
        Ok(overview) => Json(overview).into_response(),
        Err(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response(),
    }
}

pub async fn handle_counters(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> Response {
    let snapshot = match load_snapshot(&state).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let counters = StatusAggregator::new(state.authorizer.as_ref())
        .only_hard_state(query.hard_states_only(&state))
        .analyze(&snapshot.host_status, &snapshot.service_status, &snapshot);

    Json(CountersReport::from(&counters)).into_response()
}

pub async fn handle_outages(State(state): State<AppState>) -> Response {
    let snapshot = match load_snapshot(&state).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let topology = snapshot.topology();
    let analyzer = OutageAnalyzer::new(state.authorizer.as_ref(), &snapshot);
    match analyzer.find_outages(&snapshot.host_status, &topology) {
        Ok(report) => Json(report).into_response(),
        Err(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SNAPSHOT: &str = r#"{
        "hosts": [
            {"name": "core"},
            {"name": "edge1", "parents": ["core"]},
            {"name": "edge2", "parents": ["core"]}
        ],
        "host_status": [
            {"host_name": "core", "state": "down"},
            {"host_name": "edge1", "state": "down"},
            {"host_name": "edge2", "state": "up", "state_type": "soft"}
        ],
        "service_status": [
            {"host_name": "edge2", "description": "HTTP", "state": "warning", "state_type": "soft"}
        ]
    }"#;

    const CYCLIC: &str = r#"{
        "hosts": [
            {"name": "a", "parents": ["b"]},
            {"name": "b", "parents": ["a"]},
            {"name": "root"},
            {"name": "c", "parents": ["root"]}
        ],
        "host_status": [
            {"host_name": "root", "state": "down"},
            {"host_name": "a", "state": "down"},
            {"host_name": "b", "state": "up"}
        ]
    }"#;

    fn state_for(json: &str) -> (AppState, NamedTempFile) {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(json.as_bytes()).unwrap();
        let config = ServerConfig {
            snapshot_path: tmp.path().to_string_lossy().to_string(),
            ..Default::default()
        };
        (AppState::new(config), tmp)
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_tactical_endpoint() {
        let (state, _tmp) = state_for(SNAPSHOT);

        let resp = handle_tactical(State(state), Query(OverviewQuery::default())).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["network_outages"]["total_blocking_outages"], 1);
        assert_eq!(body["counters"]["total_hosts"], 3);
        assert_eq!(body["counters"]["services_warning_unacknowledged"], 1);
    }

    #[tokio::test]
    async fn test_counters_hard_states_only() {
        let (state, _tmp) = state_for(SNAPSHOT);
        let query = OverviewQuery {
            hard_states_only: Some(true),
        };

        let resp = handle_counters(State(state), Query(query)).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["counters"]["total_hosts"], 2);
        assert_eq!(body["counters"]["total_services"], 0);
        assert_eq!(body["health"]["percent_host_health"], 0.0);
    }

    #[tokio::test]
    async fn test_outages_endpoint() {
        let (state, _tmp) = state_for(SNAPSHOT);

        let resp = handle_outages(State(state)).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["outages"][0]["host"]["name"], "core");
        assert_eq!(body["outages"][0]["affected_child_hosts"], 3);
    }

    #[tokio::test]
    async fn test_cyclic_topology_rejected() {
        let (state, _tmp) = state_for(CYCLIC);

        let resp = handle_outages(State(state)).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_missing_snapshot() {
        let config = ServerConfig {
            snapshot_path: "/nonexistent/status-snapshot.json".to_string(),
            ..Default::default()
        };

        let resp = handle_outages(State(AppState::new(config))).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
