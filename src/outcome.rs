use serde::Serialize;

use crate::error::DataSourceError;
use crate::models::PassiveEnergyResult;

/// UI-facing outcome of one energy balance calculation
///
/// Closed union: a consumer must handle every variant explicitly, so a
/// missing-permissions state can never be mistaken for "burned 0 kcal". The
/// high-passive anomaly flag rides inside the successful result and never
/// changes the success/failure tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome")]
pub enum EnergyBalanceOutcome {
    /// Calculation completed; the result carries the anomaly flag unmodified
    Success(PassiveEnergyResult),

    /// Data access was revoked or never granted; the UI must show a
    /// reconnect prompt, never a silent zero
    PermissionsMissing,

    /// Host data platform not installed or not reachable; terminal for the
    /// session until the platform comes back
    PlatformUnavailable,

    /// Recoverable failure; the caller may retry
    TransientFailure,
}

impl From<DataSourceError> for EnergyBalanceOutcome {
    fn from(err: DataSourceError) -> Self {
        match err {
            DataSourceError::PermissionsMissing => EnergyBalanceOutcome::PermissionsMissing,
            DataSourceError::PlatformUnavailable => EnergyBalanceOutcome::PlatformUnavailable,
            DataSourceError::TransientFailure { .. } => EnergyBalanceOutcome::TransientFailure,
        }
    }
}

impl EnergyBalanceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, EnergyBalanceOutcome::Success(_))
    }

    pub fn result(&self) -> Option<&PassiveEnergyResult> {
        match self {
            EnergyBalanceOutcome::Success(result) => Some(result),
            _ => None,
        }
    }

    /// Whether the caller may usefully retry the calculation
    pub fn is_retryable(&self) -> bool {
        matches!(self, EnergyBalanceOutcome::TransientFailure)
    }

    /// User-facing message for the non-success variants
    pub fn user_message(&self) -> Option<String> {
        match self {
            EnergyBalanceOutcome::Success(_) => None,
            EnergyBalanceOutcome::PermissionsMissing => Some(
                "Health data access is not granted. Reconnect your health data source to see today's energy."
                    .to_string(),
            ),
            EnergyBalanceOutcome::PlatformUnavailable => {
                Some("The health data platform is not available on this device.".to_string())
            }
            EnergyBalanceOutcome::TransientFailure => {
                Some("Could not read health data right now. Pull to refresh to try again.".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_from_data_source_error() {
        assert_eq!(
            EnergyBalanceOutcome::from(DataSourceError::PermissionsMissing),
            EnergyBalanceOutcome::PermissionsMissing
        );
        assert_eq!(
            EnergyBalanceOutcome::from(DataSourceError::PlatformUnavailable),
            EnergyBalanceOutcome::PlatformUnavailable
        );
        assert_eq!(
            EnergyBalanceOutcome::from(DataSourceError::TransientFailure {
                reason: "timeout".to_string()
            }),
            EnergyBalanceOutcome::TransientFailure
        );
    }

    #[test]
    fn test_retryable_and_messages() {
        assert!(EnergyBalanceOutcome::TransientFailure.is_retryable());
        assert!(!EnergyBalanceOutcome::PermissionsMissing.is_retryable());
        assert!(EnergyBalanceOutcome::PermissionsMissing
            .user_message()
            .unwrap()
            .contains("Reconnect"));
    }

    #[test]
    fn test_anomaly_does_not_change_tag() {
        let result = PassiveEnergyResult {
            raw_passive_kcal: 6800.0,
            passive_kcal: 6800.0,
            plausible_max_kcal: 5400.0,
            is_high_passive_anomaly: true,
            ratio: Some(3.33),
            bmr_elapsed_kcal: 900.0,
            active_kcal: 300.0,
            daily_bmr_kcal: 1800.0,
        };

        let outcome = EnergyBalanceOutcome::Success(result);
        assert!(outcome.is_success());
        assert!(outcome.result().unwrap().is_high_passive_anomaly);
    }
}
