//! The session controller.
//!
//! [`reduce`] applies one [`Event`] to the [`Model`] and returns the platform
//! work that has to happen next. It never talks to a capability itself, so
//! every transition can be tested without a shell.

use tracing::{debug, info, warn};

use crate::capabilities::{
    CameraOutput, CameraResult, KvKey, KvOperation, KvResult, LocationAccuracy, LocationResult,
    PickerOptions, ShareError, ShareOutput, ShareResult,
};
use crate::event::Event;
use crate::model::{Activity, Coordinate, Model, PhotoCapture, PhotoRef, PhotoSource, UnixTimeMs};
use crate::permissions::{GateDecision, Permission, PermissionStatus};
use crate::visits::VisitError;
use crate::SessionError;

/// Platform work requested by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    RequestPermission(Permission),
    FetchCoordinate(LocationAccuracy),
    LaunchCamera(PickerOptions),
    LaunchGallery(PickerOptions),
    /// Fire-and-forget; the answer is only logged.
    PersistLastLocation { key: KvKey, value: Vec<u8> },
    CheckShareAvailable,
    SharePhoto(PhotoRef),
    Render,
}

pub fn reduce(model: &mut Model, event: Event) -> Vec<SideEffect> {
    debug!(event = event.name(), busy = ?model.in_flight, "reducing event");

    match event {
        Event::Started => start(model),

        Event::PlaceNameChanged(name) => {
            model.session.set_place_name(name);
            vec![SideEffect::Render]
        }

        Event::FetchLocationRequested => begin_gated(model, Activity::Location),
        Event::CapturePhotoRequested => begin_gated(model, Activity::Camera),
        Event::PickPhotoRequested => begin_gated(model, Activity::Gallery),

        Event::ClearPhotoRequested => {
            model.session.clear_photo();
            debug!("photo cleared");
            vec![SideEffect::Render]
        }

        Event::SaveVisitRequested => save_visit(model),
        Event::SharePhotoRequested => request_share(model),

        Event::FlipCameraRequested => {
            model.camera_facing = model.camera_facing.flipped();
            debug!(facing = ?model.camera_facing, "camera flipped");
            vec![SideEffect::Render]
        }

        Event::NoticeDismissed => {
            model.clear_notice();
            vec![SideEffect::Render]
        }

        Event::PermissionResolved { permission, status } => {
            permission_resolved(model, permission, status)
        }
        Event::LocationResolved(result) => location_resolved(model, *result),
        Event::PhotoResolved { source, result, at } => photo_resolved(model, source, *result, at),
        Event::LocationPersisted(result) => {
            location_persisted(&result);
            Vec::new()
        }
        Event::ShareAvailability(available) => share_availability(model, available),
        Event::ShareResolved(result) => share_resolved(model, *result),
    }
}

fn start(model: &mut Model) -> Vec<SideEffect> {
    if model.started {
        debug!("startup already ran, ignored");
        return Vec::new();
    }
    if !model.begin(Activity::Startup) {
        debug!(busy = ?model.in_flight, "startup dropped, slot taken");
        return Vec::new();
    }
    model.started = true;
    info!("session starting");
    startup_step(model, Permission::Location)
}

/// Checks `permission` as part of the startup chain, skipping the prompt
/// when it is already granted.
fn startup_step(model: &mut Model, permission: Permission) -> Vec<SideEffect> {
    match model.permissions.check(permission) {
        GateDecision::Request => vec![SideEffect::RequestPermission(permission), SideEffect::Render],
        GateDecision::Proceed => match permission {
            Permission::Location => startup_step(model, Permission::Camera),
            Permission::Camera | Permission::Gallery => finish_startup(model),
        },
    }
}

fn finish_startup(model: &mut Model) -> Vec<SideEffect> {
    model.finish(Activity::Startup);
    info!(
        location = ?model.permissions.status(Permission::Location),
        camera = ?model.permissions.status(Permission::Camera),
        "startup permissions settled"
    );

    if model.permissions.status(Permission::Location).is_granted() && model.begin(Activity::Location)
    {
        return vec![
            SideEffect::FetchCoordinate(model.config.location_accuracy),
            SideEffect::Render,
        ];
    }
    vec![SideEffect::Render]
}

fn begin_gated(model: &mut Model, activity: Activity) -> Vec<SideEffect> {
    let Some(permission) = activity.permission() else {
        return Vec::new();
    };
    if !model.begin(activity) {
        debug!(
            requested = activity.label(),
            busy = ?model.in_flight,
            "trigger dropped, slot taken"
        );
        return Vec::new();
    }

    match model.permissions.check(permission) {
        GateDecision::Proceed => vec![launch(model, activity), SideEffect::Render],
        GateDecision::Request => {
            debug!(%permission, "requesting permission before {}", activity.label());
            vec![SideEffect::RequestPermission(permission), SideEffect::Render]
        }
    }
}

fn launch(model: &Model, activity: Activity) -> SideEffect {
    match activity {
        Activity::Camera => SideEffect::LaunchCamera(model.config.camera_options(model.camera_facing)),
        Activity::Gallery => SideEffect::LaunchGallery(model.config.gallery_options()),
        Activity::Location | Activity::Startup | Activity::Share => {
            SideEffect::FetchCoordinate(model.config.location_accuracy)
        }
    }
}

fn permission_resolved(
    model: &mut Model,
    permission: Permission,
    status: PermissionStatus,
) -> Vec<SideEffect> {
    let Some(activity) = model.in_flight else {
        warn!(%permission, ?status, "permission answer with nothing in flight, ignored");
        return Vec::new();
    };

    if activity == Activity::Startup {
        if permission == Permission::Gallery {
            warn!(%permission, "unexpected permission answer during startup, ignored");
            return Vec::new();
        }
        let effective = model.permissions.record(permission, status);
        info!(%permission, status = ?effective, "startup permission answered");
        // The first denial of the chain stays on screen.
        if effective.is_denied() && model.notice.is_none() {
            model.set_notice(SessionError::PermissionDenied(permission));
        }
        return match permission {
            Permission::Location => startup_step(model, Permission::Camera),
            Permission::Camera | Permission::Gallery => finish_startup(model),
        };
    }

    if activity.permission() != Some(permission) {
        warn!(%permission, busy = activity.label(), "permission answer for another activity, ignored");
        return Vec::new();
    }

    let effective = model.permissions.record(permission, status);
    if effective.is_granted() {
        info!(%permission, "permission granted, resuming {}", activity.label());
        vec![launch(model, activity), SideEffect::Render]
    } else {
        info!(%permission, "permission denied, {} aborted", activity.label());
        model.finish(activity);
        model.set_notice(SessionError::PermissionDenied(permission));
        vec![SideEffect::Render]
    }
}

fn location_resolved(model: &mut Model, result: LocationResult) -> Vec<SideEffect> {
    if !model.finish(Activity::Location) {
        warn!(busy = ?model.in_flight, "location answer with no fetch in flight, ignored");
        return Vec::new();
    }

    let fix = match result {
        Ok(fix) => fix,
        Err(e) if e.is_permission_error() => {
            model.permissions.record(Permission::Location, PermissionStatus::Denied);
            model.set_notice(SessionError::PermissionDenied(Permission::Location));
            return vec![SideEffect::Render];
        }
        Err(e) => {
            warn!(error = %e, "location fetch failed");
            model.set_notice(SessionError::LocationUnavailable(e.to_string()));
            return vec![SideEffect::Render];
        }
    };

    let coordinate = match fix.coordinate() {
        Ok(coordinate) => coordinate,
        Err(e) => {
            warn!(error = %e, "platform returned an invalid fix");
            model.set_notice(SessionError::LocationUnavailable(e.to_string()));
            return vec![SideEffect::Render];
        }
    };

    model.session.apply_coordinate(coordinate, &model.config);
    info!(
        latitude = coordinate.latitude(),
        longitude = coordinate.longitude(),
        accuracy_m = ?fix.accuracy_m,
        "coordinate updated"
    );

    let mut effects = Vec::with_capacity(2);
    if model.config.persist_last_location {
        effects.extend(persist_coordinate(&model.config.last_location_key, coordinate));
    }
    effects.push(SideEffect::Render);
    effects
}

fn persist_coordinate(key: &str, coordinate: Coordinate) -> Option<SideEffect> {
    let value = match serde_json::to_vec(&coordinate) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %SessionError::PersistenceFailure(e.to_string()), "coordinate not persisted");
            return None;
        }
    };
    match KvOperation::set(key, value) {
        Ok(KvOperation::Set { key, value }) => Some(SideEffect::PersistLastLocation { key, value }),
        Err(e) => {
            warn!(error = %SessionError::PersistenceFailure(e.to_string()), "coordinate not persisted");
            None
        }
    }
}

fn location_persisted(result: &KvResult) {
    match result {
        Ok(_) => debug!("last location persisted"),
        Err(e) => warn!(
            error = %SessionError::PersistenceFailure(e.to_string()),
            retryable = e.is_retryable(),
            "last location not persisted, in-memory state kept"
        ),
    }
}

fn photo_resolved(
    model: &mut Model,
    source: PhotoSource,
    result: CameraResult,
    at: UnixTimeMs,
) -> Vec<SideEffect> {
    if !model.finish(source.activity()) {
        warn!(%source, busy = ?model.in_flight, "photo answer with nothing matching in flight, ignored");
        return Vec::new();
    }

    match result {
        Ok(CameraOutput::Photo(asset)) => match PhotoRef::new(asset.uri) {
            Ok(reference) => {
                info!(%source, captured_at = at.as_millis(), ?reference, "photo replaced");
                model.session.replace_photo(PhotoCapture {
                    reference,
                    captured_at: at,
                    source,
                });
            }
            Err(e) => {
                warn!(%source, error = %e, "platform returned an unusable photo reference");
                model.set_notice(SessionError::PhotoFailed {
                    origin: source,
                    reason: e.to_string(),
                });
            }
        },
        Ok(CameraOutput::Cancelled) => {
            debug!(%source, "photo cancelled by the user");
        }
        Err(e) if e.is_permission_error() => {
            model.permissions.record(source.permission(), PermissionStatus::Denied);
            model.set_notice(SessionError::PermissionDenied(source.permission()));
        }
        Err(e) => {
            warn!(%source, error = %e, retryable = e.is_retryable(), "photo failed");
            model.set_notice(SessionError::PhotoFailed {
                origin: source,
                reason: e.to_string(),
            });
        }
    }
    vec![SideEffect::Render]
}

fn save_visit(model: &mut Model) -> Vec<SideEffect> {
    let session = &mut model.session;
    let saved = session
        .visits
        .add_visit(&session.place_name, session.current_photo.as_ref())
        .map(|record| record.id);

    match saved {
        Ok(id) => info!(%id, visits = model.session.visits.len(), "visit saved"),
        Err(e @ VisitError::IncompleteVisit) => {
            debug!("visit save rejected, no photo");
            model.set_notice(SessionError::from(e));
        }
    }
    vec![SideEffect::Render]
}

fn request_share(model: &mut Model) -> Vec<SideEffect> {
    if model.session.current_photo.is_none() {
        model.set_notice(SessionError::SharingUnavailable);
        return vec![SideEffect::Render];
    }
    if !model.begin(Activity::Share) {
        debug!(busy = ?model.in_flight, "share dropped, slot taken");
        return Vec::new();
    }
    vec![SideEffect::CheckShareAvailable, SideEffect::Render]
}

fn share_availability(model: &mut Model, available: bool) -> Vec<SideEffect> {
    if model.in_flight != Some(Activity::Share) {
        warn!(busy = ?model.in_flight, "share availability with no share in flight, ignored");
        return Vec::new();
    }

    match (&model.session.current_photo, available) {
        (Some(photo), true) => vec![SideEffect::SharePhoto(photo.reference.clone())],
        _ => {
            model.finish(Activity::Share);
            model.set_notice(SessionError::SharingUnavailable);
            vec![SideEffect::Render]
        }
    }
}

fn share_resolved(model: &mut Model, result: ShareResult) -> Vec<SideEffect> {
    if !model.finish(Activity::Share) {
        warn!(busy = ?model.in_flight, "share answer with no share in flight, ignored");
        return Vec::new();
    }

    match result {
        Ok(ShareOutput::Shared) => info!("photo shared"),
        Ok(ShareOutput::Dismissed) => debug!("share sheet dismissed"),
        Ok(ShareOutput::Available(_)) => warn!("availability answer to a share request"),
        Err(ShareError::NotAvailable) => model.set_notice(SessionError::SharingUnavailable),
        Err(e) => {
            warn!(error = %e, "share failed");
            model.set_notice(SessionError::ShareFailed(e.to_string()));
        }
    }
    vec![SideEffect::Render]
}
