//! Analysis service client over HTTP.

use std::time::Duration;

use async_trait::async_trait;

use photo_capture_core::models::error::CaptureError;
use photo_capture_core::traits::analysis_service::{AnalysisService, ServiceResponse};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Posts JSON to the analysis endpoint with `reqwest`.
///
/// Any HTTP status is returned as a `ServiceResponse`; only transport
/// failures become errors.
pub struct HttpAnalysisService {
    client: reqwest::Client,
}

impl HttpAnalysisService {
    pub fn new() -> Result<Self, CaptureError> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, CaptureError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                CaptureError::ConfigurationFailed(format!("failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn post_json(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<ServiceResponse, CaptureError> {
        log::debug!("POST {}", endpoint);

        let resp = self
            .client
            .post(endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| CaptureError::NetworkFailure(describe(&e)))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| CaptureError::NetworkFailure(format!("failed to read response: {}", e)))?;

        log::debug!("analysis service replied {} ({} bytes)", status, text.len());
        Ok(ServiceResponse::new(status, text))
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".into()
    } else if e.is_connect() {
        format!("could not connect: {}", e)
    } else if e.is_builder() {
        format!("invalid request: {}", e)
    } else {
        e.to_string()
    }
}
