use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Coordinate, CoordinateError};

/// One-shot device positioning.
pub struct Location<Ev> {
    context: CapabilityContext<LocationOperation, Ev>,
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<Ev> Location<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<LocationOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn current_position<F>(&self, accuracy: LocationAccuracy, make_event: F)
    where
        F: FnOnce(LocationResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(LocationOperation::CurrentPosition { accuracy })
                .await;
            context.update_app(make_event(result));
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocationAccuracy {
    Low,
    #[default]
    Balanced,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationOperation {
    CurrentPosition { accuracy: LocationAccuracy },
}

impl Operation for LocationOperation {
    type Output = LocationResult;
}

/// Raw fix as reported by the platform, not yet validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: Option<f64>,
    pub timestamp_ms: Option<u64>,
}

impl LocationFix {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: None,
            timestamp_ms: None,
        }
    }

    pub fn coordinate(&self) -> Result<Coordinate, CoordinateError> {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location services are disabled")]
    ServicesDisabled,

    #[error("no fix within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("position unavailable: {reason}")]
    Unavailable { reason: String },
}

impl LocationError {
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, LocationError::PermissionDenied)
    }
}

pub type LocationResult = Result<LocationFix, LocationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_to_coordinate() {
        let fix = LocationFix::new(-22.9068, -43.1729);
        let coordinate = fix.coordinate().unwrap();
        assert_eq!(coordinate.latitude(), -22.9068);
        assert_eq!(coordinate.longitude(), -43.1729);
    }

    #[test]
    fn test_bad_fix_is_rejected() {
        assert!(LocationFix::new(f64::NAN, 0.0).coordinate().is_err());
        assert!(LocationFix::new(0.0, 200.0).coordinate().is_err());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            LocationError::Timeout { timeout_ms: 500 }.to_string(),
            "no fix within 500ms"
        );
        assert!(LocationError::PermissionDenied.is_permission_error());
        assert!(!LocationError::ServicesDisabled.is_permission_error());
    }

    #[test]
    fn test_shell_result_deserializes() {
        let json = r#"{"Ok":{"latitude":1.5,"longitude":2.5,"accuracy_m":12.0,"timestamp_ms":null}}"#;
        let result: LocationResult = serde_json::from_str(json).unwrap();
        assert_eq!(
            result.unwrap().accuracy_m,
            Some(12.0)
        );
    }
}
