use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::permissions::{Permission, PermissionStatus};

/// Platform permission prompts for location, camera and the photo library.
pub struct Permissions<Ev> {
    context: CapabilityContext<PermissionOperation, Ev>,
}

impl<Ev> Capability<Ev> for Permissions<Ev> {
    type Operation = PermissionOperation;
    type MappedSelf<MappedEv> = Permissions<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Permissions::new(self.context.map_event(f))
    }
}

impl<Ev> Permissions<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<PermissionOperation, Ev>) -> Self {
        Self { context }
    }

    /// Prompts if needed. The shell answers without a prompt when the user
    /// already decided.
    pub fn request<F>(&self, permission: Permission, make_event: F)
    where
        F: FnOnce(PermissionStatus) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let status = context
                .request_from_shell(PermissionOperation::Request(permission))
                .await;
            context.update_app(make_event(status));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "permission")]
pub enum PermissionOperation {
    Request(Permission),
}

impl Operation for PermissionOperation {
    type Output = PermissionStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_wire_format() {
        let op = PermissionOperation::Request(Permission::Gallery);
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(json, r#"{"op":"Request","permission":"gallery"}"#);
    }

    #[test]
    fn test_status_wire_format() {
        let status: PermissionStatus = serde_json::from_str(r#""undetermined""#).unwrap();
        assert_eq!(status, PermissionStatus::Undetermined);
    }
}
