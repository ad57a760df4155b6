use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::processing::data_url;

/// Where a captured frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    Camera,
    Gallery,
}

/// Whether a session starts from the live camera or from the file picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    Camera,
    Gallery,
}

impl EntryMode {
    /// The frame provenance this mode produces.
    pub fn source(self) -> CaptureSource {
        match self {
            Self::Camera => CaptureSource::Camera,
            Self::Gallery => CaptureSource::Gallery,
        }
    }
}

/// An uncompressed RGBA frame read back from a preview surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 pixels, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

impl RawFrame {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// An encoded still image waiting to be submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    pub id: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub source: CaptureSource,
    pub captured_at: DateTime<Utc>,
}

impl CapturedFrame {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, source: CaptureSource) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            bytes,
            mime_type: mime_type.into(),
            source,
            captured_at: Utc::now(),
        }
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// `data:<mime>;base64,<payload>` form sent to the analysis service.
    pub fn to_data_url(&self) -> String {
        data_url::encode(&self.mime_type, &self.bytes)
    }
}
