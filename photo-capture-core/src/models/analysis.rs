use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::frame::CaptureSource;

/// Structured payload returned by the analysis service.
///
/// Opaque to this crate; guaranteed to be a non-empty object or array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(serde_json::Value);

impl AnalysisResult {
    pub(crate) fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }
}

/// What the results view receives after a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisHandoff {
    pub analysis_data: AnalysisResult,
    pub timestamp: DateTime<Utc>,
    pub source: CaptureSource,
}

impl AnalysisHandoff {
    pub fn new(analysis_data: AnalysisResult, source: CaptureSource) -> Self {
        Self {
            analysis_data,
            timestamp: Utc::now(),
            source,
        }
    }
}

/// Navigation requested by the session when it finishes.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// Continue to the results view.
    Results(AnalysisHandoff),
    /// Return to the previous view with no payload.
    Back,
}
