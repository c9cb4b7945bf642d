use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Platform share sheet.
pub struct Share<Ev> {
    context: CapabilityContext<ShareOperation, Ev>,
}

impl<Ev> Capability<Ev> for Share<Ev> {
    type Operation = ShareOperation;
    type MappedSelf<MappedEv> = Share<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Share::new(self.context.map_event(f))
    }
}

impl<Ev> Share<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<ShareOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn check_availability<F>(&self, make_event: F)
    where
        F: FnOnce(bool) -> Ev + Send + 'static,
    {
        let wrapper = move |result: ShareResult| {
            let available = result.ok().and_then(|o| o.is_available()).unwrap_or(false);
            make_event(available)
        };
        self.request(ShareOperation::IsAvailable, wrapper);
    }

    pub fn share<F>(&self, uri: String, make_event: F)
    where
        F: FnOnce(ShareResult) -> Ev + Send + 'static,
    {
        self.request(ShareOperation::Share { uri }, make_event);
    }

    fn request<F>(&self, operation: ShareOperation, make_event: F)
    where
        F: FnOnce(ShareResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(operation).await;
            context.update_app(make_event(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "data")]
pub enum ShareOperation {
    IsAvailable,
    Share { uri: String },
}

impl Operation for ShareOperation {
    type Output = ShareResult;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum ShareOutput {
    Available(bool),
    Shared,
    /// The user closed the sheet without picking a target.
    Dismissed,
}

impl ShareOutput {
    #[must_use]
    pub const fn is_available(&self) -> Option<bool> {
        match self {
            Self::Available(available) => Some(*available),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShareError {
    #[error("sharing is not available on this device")]
    NotAvailable,

    #[error("file not found: {uri}")]
    FileNotFound { uri: String },

    #[error("share failed: {message}")]
    Failed { message: String },
}

pub type ShareResult = Result<ShareOutput, ShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_extraction() {
        assert_eq!(ShareOutput::Available(true).is_available(), Some(true));
        assert_eq!(ShareOutput::Available(false).is_available(), Some(false));
        assert_eq!(ShareOutput::Shared.is_available(), None);
    }

    #[test]
    fn test_operation_serialization() {
        let op = ShareOperation::Share {
            uri: "file:///a.jpg".into(),
        };
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(json, r#"{"op":"Share","data":{"uri":"file:///a.jpg"}}"#);
        let back: ShareOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }

    #[test]
    fn test_error_serialization() {
        let error = ShareError::Failed {
            message: "boom".into(),
        };
        let json = serde_json::to_string(&error).unwrap();
        let back: ShareError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, back);
    }
}
