use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DEFAULT_PHOTO_QUALITY;

/// Camera and photo-library picker.
pub struct Camera<Ev> {
    context: CapabilityContext<CameraOperation, Ev>,
}

impl<Ev> Capability<Ev> for Camera<Ev> {
    type Operation = CameraOperation;
    type MappedSelf<MappedEv> = Camera<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Camera::new(self.context.map_event(f))
    }
}

impl<Ev> Camera<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<CameraOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn capture<F>(&self, options: PickerOptions, make_event: F)
    where
        F: FnOnce(CameraResult) -> Ev + Send + 'static,
    {
        self.request(
            CameraOperation::Capture {
                options: options.validated(),
            },
            make_event,
        );
    }

    pub fn pick_from_gallery<F>(&self, options: PickerOptions, make_event: F)
    where
        F: FnOnce(CameraResult) -> Ev + Send + 'static,
    {
        self.request(
            CameraOperation::PickFromGallery {
                options: options.validated(),
            },
            make_event,
        );
    }

    fn request<F>(&self, operation: CameraOperation, make_event: F)
    where
        F: FnOnce(CameraResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(operation).await;
            context.update_app(make_event(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraOperation {
    Capture { options: PickerOptions },
    PickFromGallery { options: PickerOptions },
}

impl Operation for CameraOperation {
    type Output = CameraResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CameraFacing {
    #[default]
    Back,
    Front,
}

impl CameraFacing {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Back => Self::Front,
            Self::Front => Self::Back,
        }
    }
}

/// Crop aspect offered by the platform editor, as width:height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: u8,
    pub height: u8,
}

impl AspectRatio {
    pub const FOUR_BY_THREE: Self = Self {
        width: 4,
        height: 3,
    };
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::FOUR_BY_THREE
    }
}

/// Options shared by camera capture and gallery pick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PickerOptions {
    pub allow_editing: bool,
    pub aspect_ratio: AspectRatio,
    /// 0-100; 100 keeps the original compression.
    pub quality: u8,
    pub facing: CameraFacing,
    /// Camera only: store the shot in the media library and return that
    /// asset's reference instead of the temporary file.
    pub save_to_library: bool,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            allow_editing: true,
            aspect_ratio: AspectRatio::FOUR_BY_THREE,
            quality: DEFAULT_PHOTO_QUALITY,
            facing: CameraFacing::Back,
            save_to_library: true,
        }
    }
}

impl PickerOptions {
    #[must_use]
    pub fn with_facing(mut self, facing: CameraFacing) -> Self {
        self.facing = facing;
        self
    }

    #[must_use]
    pub fn without_library_copy(mut self) -> Self {
        self.save_to_library = false;
        self
    }

    #[must_use]
    pub fn validated(mut self) -> Self {
        self.quality = self.quality.min(100);
        self.aspect_ratio.width = self.aspect_ratio.width.max(1);
        self.aspect_ratio.height = self.aspect_ratio.height.max(1);
        self
    }
}

/// A photo the platform confirmed. `uri` points at bytes the platform owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapturedAsset {
    pub uri: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl CapturedAsset {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            width: None,
            height: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraOutput {
    Photo(CapturedAsset),
    Cancelled,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("capture failed: {reason}")]
    CaptureFailed { reason: String },

    #[error("could not save the photo to the media library: {reason}")]
    LibrarySaveFailed { reason: String },

    #[error("operation cancelled - another operation in progress")]
    Busy,

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CameraError {
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, CameraError::PermissionDenied)
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CameraError::Busy | CameraError::Unavailable { .. } | CameraError::CaptureFailed { .. }
        )
    }
}

pub type CameraResult = Result<CameraOutput, CameraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picker_defaults_match_the_screen() {
        let options = PickerOptions::default();
        assert!(options.allow_editing);
        assert_eq!(options.aspect_ratio, AspectRatio { width: 4, height: 3 });
        assert_eq!(options.quality, 100);
        assert_eq!(options.facing, CameraFacing::Back);
        assert!(options.save_to_library);
    }

    #[test]
    fn test_picker_builder() {
        let options = PickerOptions::default()
            .with_facing(CameraFacing::Front)
            .without_library_copy();

        assert_eq!(options.facing, CameraFacing::Front);
        assert!(!options.save_to_library);
        assert!(options.allow_editing);
    }

    #[test]
    fn test_picker_validation_clamps() {
        let mut options = PickerOptions::default();
        options.quality = 250;
        options.aspect_ratio = AspectRatio { width: 0, height: 0 };
        let options = options.validated();
        assert_eq!(options.quality, 100);
        assert_eq!(options.aspect_ratio, AspectRatio { width: 1, height: 1 });
    }

    #[test]
    fn test_facing_flip_round_trips() {
        assert_eq!(CameraFacing::Back.flipped(), CameraFacing::Front);
        assert_eq!(CameraFacing::Back.flipped().flipped(), CameraFacing::Back);
    }

    #[test]
    fn test_shell_output_deserializes() {
        let output: CameraOutput =
            serde_json::from_str(r#"{"Photo":{"uri":"file:///a.jpg","width":4,"height":3}}"#)
                .unwrap();
        assert_eq!(
            output,
            CameraOutput::Photo(CapturedAsset {
                uri: "file:///a.jpg".into(),
                width: Some(4),
                height: Some(3),
            })
        );
        let output: CameraOutput = serde_json::from_str(r#""Cancelled""#).unwrap();
        assert_eq!(output, CameraOutput::Cancelled);
    }

    #[test]
    fn test_camera_error_helpers() {
        assert!(CameraError::PermissionDenied.is_permission_error());
        assert!(!CameraError::Busy.is_permission_error());

        assert!(CameraError::Busy.is_retryable());
        assert!(!CameraError::PermissionDenied.is_retryable());
    }

    #[test]
    fn test_operation_serialization() {
        let op = CameraOperation::PickFromGallery {
            options: PickerOptions::default(),
        };
        let json = serde_json::to_string(&op).unwrap();
        let back: CameraOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }
}
