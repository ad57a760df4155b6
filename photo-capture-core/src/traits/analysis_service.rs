use async_trait::async_trait;

use crate::models::error::CaptureError;

/// Raw HTTP response from the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: String,
}

impl ServiceResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport to the remote analysis service.
///
/// Implementations only move bytes: any response that arrives is returned
/// as-is, whatever its status. Interpretation happens in the submission
/// pipeline. Failures to connect or read map to `NetworkFailure`.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn post_json(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<ServiceResponse, CaptureError>;
}
