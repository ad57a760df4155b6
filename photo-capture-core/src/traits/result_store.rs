use crate::models::error::CaptureError;

/// Transient key/value store read by the results view.
///
/// Writes are best-effort: callers log failures and carry on.
pub trait ResultStore: Send + Sync {
    fn put(&self, key: &str, value: &serde_json::Value) -> Result<(), CaptureError>;

    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CaptureError>;
}
