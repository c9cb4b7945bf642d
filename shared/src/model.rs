use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::capabilities::CameraFacing;
use crate::config::SessionConfig;
use crate::permissions::{Permission, PermissionGate};
use crate::visits::VisitStore;
use crate::{AppError, MAX_PHOTO_URI_LENGTH};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Coordinate value is not finite (NaN or Infinity)")]
    NonFinite,
}

/// Validated lat/lon. Replaced wholesale on every fix, never edited.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Map region centred on a coordinate with fixed spans.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapViewport {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub latitude_span: f64,
    pub longitude_span: f64,
}

impl MapViewport {
    #[must_use]
    pub const fn around(center: Coordinate, latitude_span: f64, longitude_span: f64) -> Self {
        Self {
            center_latitude: center.latitude,
            center_longitude: center.longitude,
            latitude_span,
            longitude_span,
        }
    }

    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate {
            latitude: self.center_latitude,
            longitude: self.center_longitude,
        }
    }
}

impl From<Coordinate> for MapViewport {
    fn from(center: Coordinate) -> Self {
        Self::around(center, crate::LATITUDE_SPAN, crate::LONGITUDE_SPAN)
    }
}

/// Explicit timestamp unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnixTimeMs(pub u64);

impl UnixTimeMs {
    #[must_use]
    pub fn now() -> Self {
        Self(crate::get_current_time_ms())
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoRefError {
    #[error("photo reference is empty")]
    Empty,
    #[error("photo reference too long ({len} > {max})")]
    TooLong { len: usize, max: usize },
}

/// Opaque locator of image bytes owned by the platform photo subsystem.
///
/// Don't store image bytes. Store a handle/URI. The platform decides the
/// format: URIs, plain paths and asset identifiers are all accepted.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoRef(String);

impl PhotoRef {
    pub fn new(uri: impl Into<String>) -> Result<Self, PhotoRefError> {
        let uri = uri.into();
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(PhotoRefError::Empty);
        }
        if trimmed.len() > MAX_PHOTO_URI_LENGTH {
            return Err(PhotoRefError::TooLong {
                len: trimmed.len(),
                max: MAX_PHOTO_URI_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Photo URIs can leak device paths and user names into logs.
impl fmt::Debug for PhotoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.split_once(':') {
            Some((scheme, _)) if !scheme.is_empty() && !scheme.contains('/') => {
                write!(f, "PhotoRef({scheme}:…)")
            }
            _ => f.write_str("PhotoRef(…)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoSource {
    Camera,
    Gallery,
}

impl PhotoSource {
    #[must_use]
    pub const fn permission(self) -> Permission {
        match self {
            Self::Camera => Permission::Camera,
            Self::Gallery => Permission::Gallery,
        }
    }

    #[must_use]
    pub const fn activity(self) -> Activity {
        match self {
            Self::Camera => Activity::Camera,
            Self::Gallery => Activity::Gallery,
        }
    }
}

impl fmt::Display for PhotoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Camera => "camera",
            Self::Gallery => "gallery",
        })
    }
}

/// The current photo. Reference and timestamp only exist together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoCapture {
    pub reference: PhotoRef,
    pub captured_at: UnixTimeMs,
    pub source: PhotoSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VisitId(pub u64);

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "visit-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub id: VisitId,
    pub place_name: String,
    pub photo: PhotoCapture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    PhotoPresent,
}

/// Everything the screen shows, owned by the session controller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub place_name: String,
    pub current_coordinate: Option<Coordinate>,
    pub current_viewport: Option<MapViewport>,
    pub current_photo: Option<PhotoCapture>,
    pub visits: VisitStore,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        if self.current_photo.is_some() {
            SessionPhase::PhotoPresent
        } else {
            SessionPhase::Idle
        }
    }

    /// Stores the typed place name as is.
    pub fn set_place_name(&mut self, name: String) {
        self.place_name = name;
    }

    pub fn apply_coordinate(&mut self, coordinate: Coordinate, config: &SessionConfig) {
        self.current_coordinate = Some(coordinate);
        self.current_viewport = Some(config.viewport_around(coordinate));
    }

    pub fn replace_photo(&mut self, photo: PhotoCapture) {
        self.current_photo = Some(photo);
    }

    pub fn clear_photo(&mut self) {
        self.current_photo = None;
    }
}

/// Asynchronous work occupying the single in-flight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Startup,
    Location,
    Camera,
    Gallery,
    Share,
}

impl Activity {
    /// The permission the activity needs before it can reach the platform.
    #[must_use]
    pub const fn permission(self) -> Option<Permission> {
        match self {
            Self::Location => Some(Permission::Location),
            Self::Camera => Some(Permission::Camera),
            Self::Gallery => Some(Permission::Gallery),
            Self::Startup | Self::Share => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Startup => "starting",
            Self::Location => "locating",
            Self::Camera => "taking_photo",
            Self::Gallery => "picking_photo",
            Self::Share => "sharing",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    pub session: SessionState,
    pub permissions: PermissionGate,
    pub in_flight: Option<Activity>,
    pub notice: Option<AppError>,
    pub camera_facing: CameraFacing,
    pub config: SessionConfig,
    /// Set once the startup permission chain has begun.
    pub started: bool,
}

impl Model {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Claims the in-flight slot. Returns `false` when something else holds it.
    pub fn begin(&mut self, activity: Activity) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        self.in_flight = Some(activity);
        true
    }

    /// Releases the slot if `activity` holds it.
    pub fn finish(&mut self, activity: Activity) -> bool {
        if self.in_flight == Some(activity) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    pub fn set_notice(&mut self, notice: impl Into<AppError>) {
        self.notice = Some(notice.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_accepts_bounds() {
        assert!(Coordinate::new(0.0, 0.0).is_ok());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(-23.5505, -46.6333).is_ok());
    }

    #[test]
    fn test_coordinate_rejects_out_of_range() {
        assert!(matches!(
            Coordinate::new(91.0, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            Coordinate::new(0.0, -181.0),
            Err(CoordinateError::LongitudeOutOfRange(_))
        ));
    }

    #[test]
    fn test_coordinate_rejects_non_finite() {
        assert_eq!(Coordinate::new(f64::NAN, 0.0), Err(CoordinateError::NonFinite));
        assert_eq!(
            Coordinate::new(0.0, f64::INFINITY),
            Err(CoordinateError::NonFinite)
        );
    }

    #[test]
    fn test_viewport_uses_fixed_spans() {
        let c = Coordinate::new(10.0, 20.0).unwrap();
        let viewport = MapViewport::from(c);
        assert_eq!(viewport.center_latitude, 10.0);
        assert_eq!(viewport.center_longitude, 20.0);
        assert_eq!(viewport.latitude_span, 0.0922);
        assert_eq!(viewport.longitude_span, 0.0421);
        assert_eq!(viewport.center(), c);
    }

    #[test]
    fn test_photo_ref_accepts_platform_handles() {
        assert!(PhotoRef::new("file:///data/user/0/photo.jpg").is_ok());
        assert!(PhotoRef::new("content://media/external/images/media/42").is_ok());
        assert!(PhotoRef::new("ph://ED7AC36B-A150-4C38-BB8C-B6D696F4F2ED/L0/001").is_ok());
        assert!(PhotoRef::new("/storage/emulated/0/DCIM/Camera/IMG_1.jpg").is_ok());
        assert!(PhotoRef::new("ED7AC36B-A150-4C38-BB8C-B6D696F4F2ED/L0/001").is_ok());
    }

    #[test]
    fn test_photo_ref_rejects_empty_and_oversized() {
        assert_eq!(PhotoRef::new("   "), Err(PhotoRefError::Empty));
        let long = format!("file:///{}", "a".repeat(MAX_PHOTO_URI_LENGTH));
        assert!(matches!(
            PhotoRef::new(long),
            Err(PhotoRefError::TooLong { .. })
        ));
    }

    #[test]
    fn test_photo_ref_debug_hides_path() {
        let r = PhotoRef::new("file:///Users/maria/DCIM/1.jpg").unwrap();
        let debug = format!("{r:?}");
        assert!(debug.starts_with("PhotoRef(file:"));
        assert!(!debug.contains("maria"));

        let r = PhotoRef::new("/home/maria/1.jpg").unwrap();
        assert_eq!(format!("{r:?}"), "PhotoRef(…)");
    }

    #[test]
    fn test_place_name_is_stored_unchanged() {
        let mut state = SessionState::new();
        let name = "ç".repeat(300);
        state.set_place_name(name.clone());
        assert_eq!(state.place_name, name);
    }

    #[test]
    fn test_phase_follows_photo() {
        let mut state = SessionState::new();
        assert_eq!(state.phase(), SessionPhase::Idle);

        state.replace_photo(PhotoCapture {
            reference: PhotoRef::new("file:///a.jpg").unwrap(),
            captured_at: UnixTimeMs(1),
            source: PhotoSource::Camera,
        });
        assert_eq!(state.phase(), SessionPhase::PhotoPresent);

        state.clear_photo();
        assert_eq!(state.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_in_flight_slot_is_exclusive() {
        let mut model = Model::default();
        assert!(model.begin(Activity::Location));
        assert!(!model.begin(Activity::Camera));
        assert!(!model.finish(Activity::Camera));
        assert!(model.finish(Activity::Location));
        assert!(!model.is_busy());
    }
}
