//! Shared core of the Foto Passeio screen.
//!
//! The core owns the location-and-photo capture session: permission checks,
//! the current coordinate and map viewport, the current photo and the list of
//! saved visits. Everything platform specific is requested from the shell
//! through the capabilities in [`capabilities`].

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod model;
pub mod permissions;
pub mod session;
pub mod view;
pub mod visits;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use app::App;
pub use capabilities::{CameraFacing, Capabilities, Effect};
pub use config::SessionConfig;
pub use event::Event;
pub use model::{
    Activity, Coordinate, CoordinateError, MapViewport, Model, PhotoCapture, PhotoRef,
    PhotoRefError, PhotoSource, SessionPhase, SessionState, UnixTimeMs, VisitId, VisitRecord,
};
pub use permissions::{GateDecision, Permission, PermissionGate, PermissionStatus};
pub use session::{reduce, SideEffect};
pub use view::ViewModel;
pub use visits::{VisitError, VisitStore};

/// Storage key of the last known coordinate.
pub const LAST_LOCATION_KEY: &str = "ultimaLocalizacao";
pub const LATITUDE_SPAN: f64 = 0.0922;
pub const LONGITUDE_SPAN: f64 = 0.0421;
pub const MAX_PHOTO_URI_LENGTH: usize = 2048;
pub const DEFAULT_PHOTO_QUALITY: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    LocationPermissionDenied,
    CameraPermissionDenied,
    GalleryPermissionDenied,
    LocationUnavailable,
    PhotoFailed,
    Storage,
    IncompleteVisit,
    SharingUnavailable,
    ShareFailed,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::LocationPermissionDenied => "LOCATION_PERMISSION_DENIED",
            Self::CameraPermissionDenied => "CAMERA_PERMISSION_DENIED",
            Self::GalleryPermissionDenied => "GALLERY_PERMISSION_DENIED",
            Self::LocationUnavailable => "LOCATION_UNAVAILABLE",
            Self::PhotoFailed => "PHOTO_FAILED",
            Self::Storage => "STORAGE_ERROR",
            Self::IncompleteVisit => "INCOMPLETE_VISIT",
            Self::SharingUnavailable => "SHARING_UNAVAILABLE",
            Self::ShareFailed => "SHARE_FAILED",
        }
    }

    /// Whether re-triggering the same action can succeed without the user
    /// changing anything outside the app.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::LocationUnavailable | Self::PhotoFailed | Self::Storage | Self::ShareFailed
        )
    }

    #[must_use]
    pub const fn from_permission(permission: Permission) -> Self {
        match permission {
            Permission::Location => Self::LocationPermissionDenied,
            Permission::Camera => Self::CameraPermissionDenied,
            Permission::Gallery => Self::GalleryPermissionDenied,
        }
    }
}

/// A user-visible notice. At most one is active at a time; the shell
/// dismisses it with [`Event::NoticeDismissed`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::LocationPermissionDenied => {
                "Location access was denied. Enable it in Settings to see where you are.".into()
            }
            ErrorKind::CameraPermissionDenied => {
                "Camera access was denied. Enable it in Settings to take photos.".into()
            }
            ErrorKind::GalleryPermissionDenied => {
                "Photo library access was denied. Enable it in Settings to pick photos.".into()
            }
            ErrorKind::LocationUnavailable => {
                "Unable to determine your location. Please check your GPS settings.".into()
            }
            ErrorKind::PhotoFailed => "The photo could not be taken. Please try again.".into(),
            ErrorKind::Storage => "Unable to save data locally.".into(),
            ErrorKind::IncompleteVisit => "Take or pick a photo before saving the visit.".into(),
            ErrorKind::SharingUnavailable => {
                "Sharing is not available. The photo cannot be shared right now.".into()
            }
            ErrorKind::ShareFailed => "The photo could not be shared. Please try again.".into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

/// Failures of a single session action. None of them end the session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("{0} permission denied")]
    PermissionDenied(Permission),
    #[error("location unavailable: {0}")]
    LocationUnavailable(String),
    #[error("could not persist the last location: {0}")]
    PersistenceFailure(String),
    #[error("a visit needs a photo")]
    IncompleteVisit,
    #[error("sharing is not available")]
    SharingUnavailable,
    #[error("{origin} failed: {reason}")]
    PhotoFailed { origin: PhotoSource, reason: String },
    #[error("sharing failed: {0}")]
    ShareFailed(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        let kind = match &e {
            SessionError::PermissionDenied(permission) => ErrorKind::from_permission(*permission),
            SessionError::LocationUnavailable(_) => ErrorKind::LocationUnavailable,
            SessionError::PersistenceFailure(_) => ErrorKind::Storage,
            SessionError::IncompleteVisit => ErrorKind::IncompleteVisit,
            SessionError::SharingUnavailable => ErrorKind::SharingUnavailable,
            SessionError::PhotoFailed { .. } => ErrorKind::PhotoFailed,
            SessionError::ShareFailed(_) => ErrorKind::ShareFailed,
        };
        AppError::new(kind, e.to_string())
    }
}

impl From<VisitError> for SessionError {
    fn from(e: VisitError) -> Self {
        match e {
            VisitError::IncompleteVisit => SessionError::IncompleteVisit,
        }
    }
}

/// Wall-clock time in milliseconds since the Unix epoch.
///
/// Returns 0 when the clock is unavailable (e.g. before the epoch).
#[must_use]
pub fn get_current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
