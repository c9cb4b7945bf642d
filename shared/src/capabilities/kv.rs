use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_KEY_LENGTH: usize = 512;
pub const MAX_VALUE_SIZE: usize = 64 * 1024;

/// Durable local key-value storage, written best-effort.
pub struct Kv<Ev> {
    context: CapabilityContext<KvOperation, Ev>,
}

impl<Ev> Capability<Ev> for Kv<Ev> {
    type Operation = KvOperation;
    type MappedSelf<MappedEv> = Kv<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Kv::new(self.context.map_event(f))
    }
}

impl<Ev> Kv<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<KvOperation, Ev>) -> Self {
        Self { context }
    }

    /// Writes `value` under `key`. The answer only reports the outcome; no
    /// caller waits on it.
    pub fn set<F>(&self, key: KvKey, value: Vec<u8>, make_event: F)
    where
        F: FnOnce(KvResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(KvOperation::Set { key, value })
                .await;
            context.update_app(make_event(result));
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KvKey(String);

impl KvKey {
    pub fn new(key: impl Into<String>) -> Result<Self, KvError> {
        let key = key.into();
        Self::validate_key(&key)?;
        Ok(Self(key))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate_key(key: &str) -> Result<(), KvError> {
        if key.trim().is_empty() {
            return Err(KvError::InvalidKey {
                key: key.to_string(),
                reason: "key cannot be empty".to_string(),
            });
        }

        if key.len() > MAX_KEY_LENGTH {
            return Err(KvError::InvalidKey {
                key: key.chars().take(50).collect::<String>() + "...",
                reason: format!("key exceeds maximum length of {MAX_KEY_LENGTH} bytes"),
            });
        }

        if key.chars().any(|c| c.is_control()) {
            return Err(KvError::InvalidKey {
                key: key.escape_default().to_string(),
                reason: "key contains control characters".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvOperation {
    Set { key: KvKey, value: Vec<u8> },
}

impl KvOperation {
    pub fn set(key: impl Into<String>, value: Vec<u8>) -> Result<Self, KvError> {
        if value.len() > MAX_VALUE_SIZE {
            return Err(KvError::ValueTooLarge {
                size: value.len(),
                max: MAX_VALUE_SIZE,
            });
        }
        Ok(Self::Set {
            key: KvKey::new(key)?,
            value,
        })
    }
}

impl Operation for KvOperation {
    type Output = KvResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    #[error("storage error: {message} (code: {code:?})")]
    Storage {
        code: StorageErrorCode,
        message: String,
    },
}

impl KvError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            KvError::Storage { code, .. } => code.is_retryable(),
            _ => false,
        }
    }

    pub fn storage(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self::Storage {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageErrorCode {
    Unknown,
    Corrupted,
    DiskFull,
    PermissionDenied,
    Busy,
    IoError,
}

impl StorageErrorCode {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageErrorCode::Busy | StorageErrorCode::IoError)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvOutput {
    Written,
}

pub type KvResult = Result<KvOutput, KvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_validation_empty() {
        assert!(matches!(KvKey::new(""), Err(KvError::InvalidKey { .. })));
        assert!(matches!(KvKey::new("   "), Err(KvError::InvalidKey { .. })));
    }

    #[test]
    fn test_key_validation_control_chars() {
        assert!(KvKey::new("key\0value").is_err());
        assert!(KvKey::new("key\x01value").is_err());
    }

    #[test]
    fn test_key_validation_too_long() {
        let long_key = "a".repeat(MAX_KEY_LENGTH + 1);
        assert!(KvKey::new(long_key).is_err());
    }

    #[test]
    fn test_last_location_key_is_valid() {
        let key = KvKey::new(crate::LAST_LOCATION_KEY).unwrap();
        assert_eq!(key.as_str(), "ultimaLocalizacao");
    }

    #[test]
    fn test_set_rejects_large_values() {
        let result = KvOperation::set("k", vec![0; MAX_VALUE_SIZE + 1]);
        assert!(matches!(result, Err(KvError::ValueTooLarge { .. })));
        assert!(KvOperation::set("k", b"{}".to_vec()).is_ok());
    }

    #[test]
    fn test_error_retryable() {
        assert!(KvError::storage(StorageErrorCode::Busy, "busy").is_retryable());
        assert!(!KvError::storage(StorageErrorCode::DiskFull, "full").is_retryable());
        assert!(!KvError::ValueTooLarge { size: 2, max: 1 }.is_retryable());
    }
}
