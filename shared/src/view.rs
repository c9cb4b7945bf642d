use serde::{Deserialize, Serialize};

use crate::capabilities::CameraFacing;
use crate::model::{MapViewport, Model, PhotoCapture, PhotoSource, SessionPhase, VisitRecord};
use crate::AppError;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub place_name: String,
    pub phase: SessionPhase,
    /// `None` until the first successful fix.
    pub map: Option<MapView>,
    pub photo: Option<PhotoView>,
    pub visits: Vec<VisitView>,
    pub is_busy: bool,
    pub busy_reason: Option<String>,
    pub camera_facing: CameraFacing,
    pub can_save_visit: bool,
    pub can_share: bool,
    pub notice: Option<NoticeView>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MapView {
    pub viewport: MapViewport,
    pub marker: MarkerView,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MarkerView {
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PhotoView {
    pub uri: String,
    pub captured_at_ms: u64,
    pub source: PhotoSource,
}

impl From<&PhotoCapture> for PhotoView {
    fn from(photo: &PhotoCapture) -> Self {
        Self {
            uri: photo.reference.as_str().to_owned(),
            captured_at_ms: photo.captured_at.as_millis(),
            source: photo.source,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VisitView {
    pub id: String,
    pub place_name: String,
    pub photo_uri: String,
    pub captured_at_ms: u64,
}

impl From<&VisitRecord> for VisitView {
    fn from(visit: &VisitRecord) -> Self {
        Self {
            id: visit.id.to_string(),
            place_name: visit.place_name.clone(),
            photo_uri: visit.photo.reference.as_str().to_owned(),
            captured_at_ms: visit.photo.captured_at.as_millis(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NoticeView {
    pub message: String,
    pub is_retryable: bool,
    pub error_code: String,
}

impl From<&AppError> for NoticeView {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            is_retryable: e.kind.is_retryable(),
            error_code: e.code().to_string(),
        }
    }
}

#[must_use]
pub fn build(model: &Model) -> ViewModel {
    let session = &model.session;

    let map = session
        .current_viewport
        .zip(session.current_coordinate)
        .map(|(viewport, coordinate)| MapView {
            viewport,
            marker: MarkerView {
                latitude: coordinate.latitude(),
                longitude: coordinate.longitude(),
                title: session.place_name.clone(),
            },
        });

    let has_photo = session.current_photo.is_some();

    ViewModel {
        place_name: session.place_name.clone(),
        phase: session.phase(),
        map,
        photo: session.current_photo.as_ref().map(PhotoView::from),
        visits: session.visits.list().iter().map(VisitView::from).collect(),
        is_busy: model.is_busy(),
        busy_reason: model.in_flight.map(|a| a.label().to_string()),
        camera_facing: model.camera_facing,
        can_save_visit: has_photo,
        can_share: has_photo && !model.is_busy(),
        notice: model.notice.as_ref().map(NoticeView::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Activity, Coordinate, PhotoRef, UnixTimeMs};
    use crate::{ErrorKind, SessionConfig};

    fn photo() -> PhotoCapture {
        PhotoCapture {
            reference: PhotoRef::new("file:///a.jpg").unwrap(),
            captured_at: UnixTimeMs(42),
            source: PhotoSource::Camera,
        }
    }

    #[test]
    fn test_empty_model() {
        let view = build(&Model::default());
        assert_eq!(view.phase, SessionPhase::Idle);
        assert!(view.map.is_none());
        assert!(view.photo.is_none());
        assert!(view.visits.is_empty());
        assert!(!view.is_busy);
        assert!(!view.can_save_visit);
        assert!(!view.can_share);
    }

    #[test]
    fn test_marker_title_is_place_name() {
        let mut model = Model::default();
        model.session.set_place_name("Beach".to_string());
        model
            .session
            .apply_coordinate(Coordinate::new(10.0, 20.0).unwrap(), &SessionConfig::default());

        let map = build(&model).map.unwrap();
        assert_eq!(map.marker.title, "Beach");
        assert_eq!(map.marker.latitude, 10.0);
        assert_eq!(map.viewport.center_longitude, 20.0);
    }

    #[test]
    fn test_photo_and_visits() {
        let mut model = Model::default();
        model.session.replace_photo(photo());
        model
            .session
            .visits
            .add_visit("Beach", model.session.current_photo.as_ref())
            .unwrap();

        let view = build(&model);
        assert_eq!(view.phase, SessionPhase::PhotoPresent);
        assert_eq!(view.photo.as_ref().map(|p| p.captured_at_ms), Some(42));
        assert_eq!(view.visits.len(), 1);
        assert_eq!(view.visits[0].id, "visit-0");
        assert_eq!(view.visits[0].photo_uri, "file:///a.jpg");
        assert!(view.can_save_visit);
        assert!(view.can_share);
    }

    #[test]
    fn test_busy_disables_share() {
        let mut model = Model::default();
        model.session.replace_photo(photo());
        model.begin(Activity::Location);

        let view = build(&model);
        assert!(view.is_busy);
        assert_eq!(view.busy_reason.as_deref(), Some("locating"));
        assert!(!view.can_share);
    }

    #[test]
    fn test_notice_view() {
        let mut model = Model::default();
        model.set_notice(AppError::new(ErrorKind::IncompleteVisit, "a visit needs a photo"));
        let notice = build(&model).notice.unwrap();
        assert_eq!(notice.error_code, "INCOMPLETE_VISIT");
        assert!(!notice.is_retryable);
        assert_eq!(notice.message, "Take or pick a photo before saving the visit.");
    }
}
