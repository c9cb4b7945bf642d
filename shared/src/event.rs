use serde::{Deserialize, Serialize};

use crate::capabilities::{CameraResult, KvResult, LocationResult, ShareResult};
use crate::model::{PhotoSource, UnixTimeMs};
use crate::permissions::{Permission, PermissionStatus};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Screen lifecycle
    Started,

    // User actions
    PlaceNameChanged(String),
    FetchLocationRequested,
    CapturePhotoRequested,
    PickPhotoRequested,
    ClearPhotoRequested,
    SaveVisitRequested,
    SharePhotoRequested,
    FlipCameraRequested,
    NoticeDismissed,

    // Capability responses (never sent by the shell, boxed to keep the enum small)
    #[serde(skip)]
    PermissionResolved {
        permission: Permission,
        status: PermissionStatus,
    },
    #[serde(skip)]
    LocationResolved(Box<LocationResult>),
    #[serde(skip)]
    PhotoResolved {
        source: PhotoSource,
        result: Box<CameraResult>,
        at: UnixTimeMs,
    },
    #[serde(skip)]
    LocationPersisted(Box<KvResult>),
    #[serde(skip)]
    ShareAvailability(bool),
    #[serde(skip)]
    ShareResolved(Box<ShareResult>),
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::PlaceNameChanged(_) => "place_name_changed",
            Self::FetchLocationRequested => "fetch_location_requested",
            Self::CapturePhotoRequested => "capture_photo_requested",
            Self::PickPhotoRequested => "pick_photo_requested",
            Self::ClearPhotoRequested => "clear_photo_requested",
            Self::SaveVisitRequested => "save_visit_requested",
            Self::SharePhotoRequested => "share_photo_requested",
            Self::FlipCameraRequested => "flip_camera_requested",
            Self::NoticeDismissed => "notice_dismissed",
            Self::PermissionResolved { .. } => "permission_resolved",
            Self::LocationResolved(_) => "location_resolved",
            Self::PhotoResolved { .. } => "photo_resolved",
            Self::LocationPersisted(_) => "location_persisted",
            Self::ShareAvailability(_) => "share_availability",
            Self::ShareResolved(_) => "share_resolved",
        }
    }

    /// Events the shell sends on behalf of the user.
    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::PlaceNameChanged(_)
                | Self::FetchLocationRequested
                | Self::CapturePhotoRequested
                | Self::PickPhotoRequested
                | Self::ClearPhotoRequested
                | Self::SaveVisitRequested
                | Self::SharePhotoRequested
                | Self::FlipCameraRequested
                | Self::NoticeDismissed
        )
    }
}
