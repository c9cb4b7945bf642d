//! Permission gate: the last answer the platform gave for each capability.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A platform-guarded permission domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Location,
    Camera,
    Gallery,
}

impl Permission {
    pub const ALL: [Permission; 3] = [Self::Location, Self::Camera, Self::Gallery];
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Location => "location",
            Self::Camera => "camera",
            Self::Gallery => "gallery",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    #[default]
    Undetermined,
}

impl PermissionStatus {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    #[must_use]
    pub const fn is_denied(self) -> bool {
        matches!(self, Self::Denied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Already granted, go straight to the platform call.
    Proceed,
    /// Ask the shell first; the action resumes on the answer.
    Request,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionGate {
    location: PermissionStatus,
    camera: PermissionStatus,
    gallery: PermissionStatus,
}

impl PermissionGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn status(&self, permission: Permission) -> PermissionStatus {
        match permission {
            Permission::Location => self.location,
            Permission::Camera => self.camera,
            Permission::Gallery => self.gallery,
        }
    }

    /// Denied is not sticky: a re-triggered action asks again.
    #[must_use]
    pub const fn check(&self, permission: Permission) -> GateDecision {
        if self.status(permission).is_granted() {
            GateDecision::Proceed
        } else {
            GateDecision::Request
        }
    }

    /// Records the answer to a permission request and returns the effective
    /// status. A prompt that ends undetermined counts as a denial.
    pub fn record(&mut self, permission: Permission, answer: PermissionStatus) -> PermissionStatus {
        let effective = match answer {
            PermissionStatus::Granted => PermissionStatus::Granted,
            PermissionStatus::Denied | PermissionStatus::Undetermined => PermissionStatus::Denied,
        };
        let slot = match permission {
            Permission::Location => &mut self.location,
            Permission::Camera => &mut self.camera,
            Permission::Gallery => &mut self.gallery,
        };
        *slot = effective;
        effective
    }
}
