use serde::{Deserialize, Serialize};

/// Viewport widths below this are treated as mobile.
const MOBILE_VIEWPORT_MAX: u32 = 768;

/// User-agent fragments that identify a handheld device.
const MOBILE_USER_AGENT_MARKERS: &[&str] = &["android", "iphone", "ipad", "ipod", "mobile"];

/// Broad class of the device running the capture UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Desktop,
    Mobile,
}

/// Which physical camera to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front-facing (selfie) camera.
    User,
    /// Rear camera.
    Environment,
}

/// Device capabilities, computed once when the session is configured.
///
/// Backends that can inspect the host (window size, user agent) build this
/// up front; the state machine never queries the environment itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub class: DeviceClass,
    pub viewport_width: u32,
}

impl DeviceProfile {
    pub fn desktop(viewport_width: u32) -> Self {
        Self {
            class: DeviceClass::Desktop,
            viewport_width,
        }
    }

    pub fn mobile(viewport_width: u32) -> Self {
        Self {
            class: DeviceClass::Mobile,
            viewport_width,
        }
    }

    /// Classify a device from its user agent string and viewport width.
    pub fn detect(user_agent: &str, viewport_width: u32) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        let handheld = MOBILE_USER_AGENT_MARKERS.iter().any(|m| ua.contains(m));
        if handheld || viewport_width < MOBILE_VIEWPORT_MAX {
            Self::mobile(viewport_width)
        } else {
            Self::desktop(viewport_width)
        }
    }

    pub fn is_mobile(&self) -> bool {
        self.class == DeviceClass::Mobile
    }

    /// Stream constraints to request for this device.
    ///
    /// Mobile cameras are asked for 1080p, desktops for 720p. Audio is never
    /// requested and the front camera is preferred.
    pub fn constraints(&self) -> MediaConstraints {
        let (ideal_width, ideal_height) = if self.is_mobile() {
            (1920, 1080)
        } else {
            (1280, 720)
        };
        MediaConstraints {
            ideal_width,
            ideal_height,
            facing_mode: FacingMode::User,
            audio: false,
        }
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::desktop(1280)
    }
}

/// Constraints passed to [`CameraDevice::acquire`](crate::CameraDevice::acquire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing_mode: FacingMode,
    pub audio: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_requests_720p_without_audio() {
        let c = DeviceProfile::detect("Mozilla/5.0 (X11; Linux x86_64)", 1440).constraints();
        assert_eq!((c.ideal_width, c.ideal_height), (1280, 720));
        assert_eq!(c.facing_mode, FacingMode::User);
        assert!(!c.audio);
    }

    #[test]
    fn phone_user_agent_is_mobile() {
        let p = DeviceProfile::detect("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)", 1024);
        assert!(p.is_mobile());
        assert_eq!(p.constraints().ideal_width, 1920);
    }

    #[test]
    fn narrow_viewport_is_mobile() {
        assert!(DeviceProfile::detect("Mozilla/5.0 (Windows NT 10.0)", 600).is_mobile());
    }

    #[test]
    fn constraints_serialize_camel_case() {
        let json = serde_json::to_value(DeviceProfile::default().constraints()).unwrap();
        assert_eq!(json["idealWidth"], 1280);
        assert_eq!(json["facingMode"], "user");
    }
}
