use crate::capabilities::Capabilities;
use crate::event::Event;
use crate::model::{Model, PhotoSource, UnixTimeMs};
use crate::session::{reduce, SideEffect};
use crate::view::{self, ViewModel};

#[derive(Default)]
pub struct App;

impl App {
    fn perform(effect: SideEffect, caps: &Capabilities) {
        match effect {
            SideEffect::RequestPermission(permission) => {
                caps.permissions.request(permission, move |status| {
                    Event::PermissionResolved { permission, status }
                });
            }
            SideEffect::FetchCoordinate(accuracy) => {
                caps.location.current_position(accuracy, |result| {
                    Event::LocationResolved(Box::new(result))
                });
            }
            SideEffect::LaunchCamera(options) => {
                caps.camera
                    .capture(options, |result| photo_resolved(PhotoSource::Camera, result));
            }
            SideEffect::LaunchGallery(options) => {
                caps.camera.pick_from_gallery(options, |result| {
                    photo_resolved(PhotoSource::Gallery, result)
                });
            }
            SideEffect::PersistLastLocation { key, value } => {
                caps.kv
                    .set(key, value, |result| Event::LocationPersisted(Box::new(result)));
            }
            SideEffect::CheckShareAvailable => {
                caps.share.check_availability(Event::ShareAvailability);
            }
            SideEffect::SharePhoto(reference) => {
                caps.share.share(reference.as_str().to_owned(), |result| {
                    Event::ShareResolved(Box::new(result))
                });
            }
            SideEffect::Render => caps.render.render(),
        }
    }
}

/// The photo is stamped when the core receives the platform's answer.
fn photo_resolved(source: PhotoSource, result: crate::capabilities::CameraResult) -> Event {
    Event::PhotoResolved {
        source,
        result: Box::new(result),
        at: UnixTimeMs::now(),
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        for effect in reduce(model, event) {
            Self::perform(effect, caps);
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        view::build(model)
    }
}
