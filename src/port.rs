//! Energy data port
//!
//! The engine's only view of the platform health-data store. A concrete
//! platform binding implements `EnergyDataPort`; the adapters here exist for
//! tests and for driving the pipeline from a JSON snapshot on the CLI.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::DataSourceError;
use crate::models::ExerciseSession;

/// Read access to platform energy data, scoped to `[start, end)`.
///
/// `fetch_total_energy_kcal` returns the all-inclusive burned-energy
/// aggregate (BMR + NEAT + exercise). `fetch_exercise_sessions` returns
/// explicit, user-initiated sessions only; the engine sums their
/// `active_kcal` itself and never takes active energy from a NEAT-inclusive
/// aggregate. Both calls are independent and may be issued concurrently.
/// Timeout and retry policy belong to the implementation, not the engine.
#[async_trait]
pub trait EnergyDataPort: Send + Sync {
    async fn fetch_total_energy_kcal(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64, DataSourceError>;

    async fn fetch_exercise_sessions(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ExerciseSession>, DataSourceError>;
}

/// Port returning fixed values, for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct StaticDataPort {
    pub total_kcal: f64,
    pub sessions: Vec<ExerciseSession>,
}

impl StaticDataPort {
    pub fn new(total_kcal: f64, sessions: Vec<ExerciseSession>) -> Self {
        StaticDataPort {
            total_kcal,
            sessions,
        }
    }
}

#[async_trait]
impl EnergyDataPort for StaticDataPort {
    async fn fetch_total_energy_kcal(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<f64, DataSourceError> {
        Ok(self.total_kcal)
    }

    async fn fetch_exercise_sessions(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<ExerciseSession>, DataSourceError> {
        Ok(self.sessions.clone())
    }
}

/// Which port call a `FailingDataPort` fails on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailingCall {
    Total,
    Sessions,
    Both,
}

/// Port that fails with a configured error, for outcome-classification tests
#[derive(Debug, Clone)]
pub struct FailingDataPort {
    pub error: DataSourceError,
    pub failing_call: FailingCall,
    /// Values served by whichever call is allowed to succeed
    pub fallback: StaticDataPort,
}

impl FailingDataPort {
    pub fn new(error: DataSourceError) -> Self {
        FailingDataPort {
            error,
            failing_call: FailingCall::Both,
            fallback: StaticDataPort::default(),
        }
    }

    pub fn failing_only(error: DataSourceError, call: FailingCall, fallback: StaticDataPort) -> Self {
        FailingDataPort {
            error,
            failing_call: call,
            fallback,
        }
    }
}

#[async_trait]
impl EnergyDataPort for FailingDataPort {
    async fn fetch_total_energy_kcal(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64, DataSourceError> {
        match self.failing_call {
            FailingCall::Total | FailingCall::Both => Err(self.error.clone()),
            FailingCall::Sessions => self.fallback.fetch_total_energy_kcal(start, end).await,
        }
    }

    async fn fetch_exercise_sessions(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ExerciseSession>, DataSourceError> {
        match self.failing_call {
            FailingCall::Sessions | FailingCall::Both => Err(self.error.clone()),
            FailingCall::Total => self.fallback.fetch_exercise_sessions(start, end).await,
        }
    }
}

/// On-disk shape of a JSON energy snapshot
#[derive(Debug, Deserialize)]
struct EnergySnapshot {
    total_kcal: f64,
    #[serde(default)]
    sessions: Vec<ExerciseSession>,
}

/// Port backed by a JSON snapshot file
///
/// Lets the CLI exercise the full pipeline without a platform binding. The
/// file is re-read on every fetch, matching the fresh-per-calculation
/// contract of the aggregate. The two fetches of one calculation read the
/// file independently, so a snapshot rewritten mid-calculation can serve the
/// total and the session list from different versions; tolerable for a demo
/// adapter, but a platform binding must read both streams from one
/// consistent view.
pub struct JsonFileDataPort {
    path: PathBuf,
}

impl JsonFileDataPort {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonFileDataPort {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_snapshot(&self) -> Result<EnergySnapshot, DataSourceError> {
        if !self.path.exists() {
            return Err(DataSourceError::PlatformUnavailable);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            DataSourceError::TransientFailure {
                reason: format!("reading {}: {e}", self.path.display()),
            }
        })?;

        serde_json::from_str(&content).map_err(|e| DataSourceError::TransientFailure {
            reason: format!("decoding {}: {e}", self.path.display()),
        })
    }
}

#[async_trait]
impl EnergyDataPort for JsonFileDataPort {
    async fn fetch_total_energy_kcal(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<f64, DataSourceError> {
        Ok(self.read_snapshot()?.total_kcal)
    }

    async fn fetch_exercise_sessions(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<ExerciseSession>, DataSourceError> {
        Ok(self.read_snapshot()?.sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window_bounds() -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.with_ymd_and_hms(2025, 3, 15, 5, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 15, 17, 0, 0).unwrap();
        (start, end)
    }

    #[tokio::test]
    async fn test_static_port_round_trip() {
        let port = StaticDataPort::new(
            2400.0,
            vec![ExerciseSession {
                active_kcal: 300.0,
                data_origin: Some("watch".to_string()),
            }],
        );
        let (start, end) = window_bounds();

        assert_eq!(port.fetch_total_energy_kcal(start, end).await.unwrap(), 2400.0);
        assert_eq!(port.fetch_exercise_sessions(start, end).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_port_single_call() {
        let port = FailingDataPort::failing_only(
            DataSourceError::PermissionsMissing,
            FailingCall::Sessions,
            StaticDataPort::new(2000.0, vec![]),
        );
        let (start, end) = window_bounds();

        assert!(port.fetch_total_energy_kcal(start, end).await.is_ok());
        assert_eq!(
            port.fetch_exercise_sessions(start, end).await.unwrap_err(),
            DataSourceError::PermissionsMissing
        );
    }

    #[tokio::test]
    async fn test_json_port_missing_file_is_platform_unavailable() {
        let port = JsonFileDataPort::new("/nonexistent/snapshot.json");
        let (start, end) = window_bounds();

        assert_eq!(
            port.fetch_total_energy_kcal(start, end).await.unwrap_err(),
            DataSourceError::PlatformUnavailable
        );
    }

    #[tokio::test]
    async fn test_json_port_reads_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(
            &path,
            r#"{ "total_kcal": 2400.0, "sessions": [ { "active_kcal": 300.0, "data_origin": "watch" } ] }"#,
        )
        .unwrap();

        let port = JsonFileDataPort::new(&path);
        let (start, end) = window_bounds();

        assert_eq!(port.fetch_total_energy_kcal(start, end).await.unwrap(), 2400.0);
        let sessions = port.fetch_exercise_sessions(start, end).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].active_kcal, 300.0);
    }
}
