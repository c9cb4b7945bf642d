//! Session tunables. The defaults reproduce the screen as shipped.

use crate::capabilities::{CameraFacing, LocationAccuracy, PickerOptions};
use crate::model::{Coordinate, MapViewport};
use crate::{LAST_LOCATION_KEY, LATITUDE_SPAN, LONGITUDE_SPAN};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub latitude_span: f64,
    pub longitude_span: f64,
    pub last_location_key: String,
    pub location_accuracy: LocationAccuracy,
    pub picker: PickerOptions,
    /// Write every new coordinate to local storage.
    pub persist_last_location: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            latitude_span: LATITUDE_SPAN,
            longitude_span: LONGITUDE_SPAN,
            last_location_key: LAST_LOCATION_KEY.to_string(),
            location_accuracy: LocationAccuracy::default(),
            picker: PickerOptions::default(),
            persist_last_location: true,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn without_persistence(mut self) -> Self {
        self.persist_last_location = false;
        self
    }

    #[must_use]
    pub fn viewport_around(&self, center: Coordinate) -> MapViewport {
        MapViewport::around(center, self.latitude_span, self.longitude_span)
    }

    /// Options for a camera capture facing `facing`.
    #[must_use]
    pub fn camera_options(&self, facing: CameraFacing) -> PickerOptions {
        self.picker.clone().with_facing(facing)
    }

    /// Options for a gallery pick. Facing and library copy do not apply.
    #[must_use]
    pub fn gallery_options(&self) -> PickerOptions {
        self.picker.clone().without_library_copy()
    }
}
