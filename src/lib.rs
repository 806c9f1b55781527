// Library interface for NeatRS modules
// This allows integration tests to access the core functionality

pub mod bmr;
pub mod config;
pub mod day_window;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod outcome;
pub mod passive;
pub mod port;
pub mod telemetry;

// Re-export commonly used types for convenience
pub use bmr::BmrCalculator;
pub use config::AppConfig;
pub use day_window::{DayBoundaryTracker, FileWindowStore, MemoryWindowStore, PersistedWindow, WindowStore};
pub use engine::EnergyBalanceEngine;
pub use error::{DataSourceError, NeatError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::{
    BiologicalSex, DayWindow, EnergyAggregate, ExerciseSession, PassiveEnergyResult, UserProfile,
};
pub use outcome::EnergyBalanceOutcome;
pub use passive::PassiveEnergyCalculator;
pub use port::{EnergyDataPort, JsonFileDataPort, StaticDataPort};
pub use telemetry::{
    NullTelemetryReporter, RecordingTelemetryReporter, TelemetryEvent, TelemetryReporter,
    TracingTelemetryReporter,
};
