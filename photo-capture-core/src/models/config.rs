use std::time::Duration;

use super::device::DeviceProfile;

/// Analysis endpoint used when none is configured.
pub const DEFAULT_ANALYSIS_ENDPOINT: &str =
    "https://us-central1-api-skinstric-ai.cloudfunctions.net/skinstricPhaseTwo";

/// Configuration for a capture session.
#[derive(Debug, Clone)]
pub struct CaptureConfiguration {
    /// URL the captured image is POSTed to.
    pub endpoint: String,

    /// Device capabilities, computed once by the embedder.
    pub device_profile: DeviceProfile,

    /// Largest accepted gallery file in bytes (default: 10 MB).
    pub max_file_bytes: u64,

    /// Minimum length of an image data URL before it is considered real
    /// content rather than an empty placeholder (default: 100).
    pub min_payload_chars: usize,

    /// JPEG quality for camera snapshots, 1–100 (default: 80).
    pub jpeg_quality: u8,

    /// Delay between acquiring the camera and showing the live preview,
    /// giving the sensor time to settle exposure (default: 2 s).
    pub warmup: Duration,
}

impl CaptureConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            return Err(format!("endpoint must be an http(s) URL: {:?}", self.endpoint));
        }
        if self.max_file_bytes == 0 {
            return Err("max file size must be positive".into());
        }
        if self.min_payload_chars == 0 {
            return Err("minimum payload length must be positive".into());
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!("unsupported jpeg quality: {}", self.jpeg_quality));
        }
        Ok(())
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ANALYSIS_ENDPOINT.to_string(),
            device_profile: DeviceProfile::default(),
            max_file_bytes: 10 * 1024 * 1024,
            min_payload_chars: 100,
            jpeg_quality: 80,
            warmup: Duration::from_secs(2),
        }
    }
}
