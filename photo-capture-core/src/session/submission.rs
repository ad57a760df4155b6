use std::sync::Arc;

use serde_json::Value;

use crate::models::analysis::{AnalysisHandoff, AnalysisResult};
use crate::models::error::CaptureError;
use crate::models::frame::CapturedFrame;
use crate::processing::data_url;
use crate::storage::result_store::{ANALYSIS_RESULT_KEY, ANALYSIS_TIMESTAMP_KEY};
use crate::traits::analysis_service::{AnalysisService, ServiceResponse};
use crate::traits::result_store::ResultStore;

/// Response fields that may wrap the analysis payload, in priority order.
const RESULT_FIELDS: &[&str] = &["data", "analysis", "results"];

/// Sends a captured frame to the analysis service and interprets the reply.
///
/// ```text
/// CapturedFrame → data URL → POST {"image": ...} → status / JSON checks
///              → AnalysisResult → AnalysisHandoff
/// ```
///
/// Persisting the hand-off is a separate step so the caller can skip it
/// for sessions that were closed while the request was in flight.
pub struct SubmissionPipeline {
    service: Box<dyn AnalysisService>,
    endpoint: String,
    min_payload_chars: usize,
    store: Option<Arc<dyn ResultStore>>,
}

impl SubmissionPipeline {
    pub fn new(service: Box<dyn AnalysisService>, endpoint: impl Into<String>) -> Self {
        Self {
            service,
            endpoint: endpoint.into(),
            min_payload_chars: 100,
            store: None,
        }
    }

    pub fn with_min_payload_chars(mut self, min_payload_chars: usize) -> Self {
        self.min_payload_chars = min_payload_chars;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check the frame is worth sending and return its data URL.
    pub fn prepare(&self, frame: &CapturedFrame) -> Result<String, CaptureError> {
        if frame.bytes.is_empty() {
            return Err(CaptureError::InvalidFrame("captured image is empty".into()));
        }
        let url = frame.to_data_url();
        data_url::validate_image(&url, self.min_payload_chars).map_err(CaptureError::InvalidFrame)?;
        Ok(url)
    }

    /// Submit `frame` and return the hand-off for the results view.
    ///
    /// Nothing is written to the result store; see [`Self::persist`].
    pub async fn submit(&self, frame: &CapturedFrame) -> Result<AnalysisHandoff, CaptureError> {
        let image = self.prepare(frame)?;
        let body = serde_json::json!({ "image": image });

        log::info!(
            "submitting frame {} ({} bytes, {}) to {}",
            frame.id,
            frame.size(),
            frame.mime_type,
            self.endpoint
        );

        let response = self.service.post_json(&self.endpoint, &body).await?;
        let result = interpret_response(&response)?;
        let handoff = AnalysisHandoff::new(result, frame.source);

        log::info!("analysis complete for frame {}", frame.id);
        Ok(handoff)
    }

    /// Best-effort write for the results view; failures are only logged.
    pub fn persist(&self, handoff: &AnalysisHandoff) {
        let Some(store) = &self.store else {
            return;
        };
        let timestamp = Value::String(handoff.timestamp.to_rfc3339());
        let written = store
            .put(ANALYSIS_RESULT_KEY, handoff.analysis_data.as_value())
            .and_then(|()| store.put(ANALYSIS_TIMESTAMP_KEY, &timestamp));
        if let Err(e) = written {
            log::warn!("failed to persist analysis result: {}", e);
        }
    }
}

/// Turn a raw service response into an analysis result.
///
/// - non-2xx: `ServiceError` with the service's message when it sent one
/// - 2xx with a non-JSON body: `ResponseParseFailure`
/// - `error` field, or `message` with no result field: `ServiceError`
/// - null, scalar, or empty payload: `EmptyResult`
pub fn interpret_response(response: &ServiceResponse) -> Result<AnalysisResult, CaptureError> {
    let parsed = serde_json::from_str::<Value>(&response.body);

    if !response.is_success() {
        let detail = parsed
            .ok()
            .as_ref()
            .and_then(service_message)
            .unwrap_or_else(|| "request failed".to_string());
        return Err(CaptureError::ServiceError(format!(
            "{} (HTTP {})",
            detail, response.status
        )));
    }

    let value = parsed.map_err(|e| CaptureError::ResponseParseFailure(e.to_string()))?;

    if let Some(message) = explicit_failure(&value) {
        return Err(CaptureError::ServiceError(message));
    }

    let payload = RESULT_FIELDS
        .iter()
        .find_map(|field| value.get(*field).filter(|v| !v.is_null()))
        .unwrap_or(&value);

    if !is_substantial(payload) {
        return Err(CaptureError::EmptyResult);
    }
    Ok(AnalysisResult::new(payload.clone()))
}

/// Human-readable message from an `error` or `message` field.
fn service_message(value: &Value) -> Option<String> {
    match value.get("error") {
        Some(Value::String(s)) => return Some(s.clone()),
        Some(Value::Object(obj)) => {
            if let Some(Value::String(s)) = obj.get("message") {
                return Some(s.clone());
            }
            return Some(Value::Object(obj.clone()).to_string());
        }
        Some(Value::Null) | Some(Value::Bool(false)) | None => {}
        Some(other) => return Some(other.to_string()),
    }
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn explicit_failure(value: &Value) -> Option<String> {
    if matches!(value.get("error"), Some(v) if !v.is_null() && *v != Value::Bool(false)) {
        return service_message(value);
    }
    let has_result = RESULT_FIELDS.iter().any(|f| value.get(*f).is_some());
    if !has_result && value.get("message").is_some() {
        return service_message(value);
    }
    None
}

fn is_substantial(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}
