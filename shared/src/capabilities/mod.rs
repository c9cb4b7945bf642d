mod camera;
mod kv;
mod location;
mod permissions;
mod share;

pub use self::camera::{
    AspectRatio, Camera, CameraError, CameraFacing, CameraOperation, CameraOutput, CameraResult,
    CapturedAsset, PickerOptions,
};
pub use self::kv::{
    Kv, KvError, KvKey, KvOperation, KvOutput, KvResult, StorageErrorCode, MAX_KEY_LENGTH,
    MAX_VALUE_SIZE,
};
pub use self::location::{
    Location, LocationAccuracy, LocationError, LocationFix, LocationOperation, LocationResult,
};
pub use self::permissions::{PermissionOperation, Permissions};
pub use self::share::{Share, ShareError, ShareOperation, ShareOutput, ShareResult};

pub use crux_core::render::Render;

use crate::event::Event;
use crate::App;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub permissions: Permissions<Event>,
    pub location: Location<Event>,
    pub camera: Camera<Event>,
    pub kv: Kv<Event>,
    pub share: Share<Event>,
}
