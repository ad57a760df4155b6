use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::models::frame::EntryMode;

/// Query keys that select gallery mode, e.g. `?mode=gallery`.
const MODE_KEYS: &[&str] = &["mode", "source"];

/// A flag that reads `true` at most once.
///
/// The previous view sets it to ask for gallery mode; the capture session
/// clears it when it consumes the hint so a reload starts from the camera.
#[derive(Debug, Clone, Default)]
pub struct OneShotFlag(Arc<AtomicBool>);

impl OneShotFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Read and clear the flag.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// Navigation input that decides how a capture session starts.
#[derive(Debug, Clone, Default)]
pub struct EntryHint {
    /// Raw query string of the capture route, with or without the leading `?`.
    pub query: Option<String>,
    /// One-shot "open the gallery" flag set by the previous view.
    pub gallery_flag: Option<OneShotFlag>,
}

impl EntryHint {
    pub fn from_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            gallery_flag: None,
        }
    }

    pub fn with_flag(mut self, flag: OneShotFlag) -> Self {
        self.gallery_flag = Some(flag);
        self
    }

    /// Decide the entry mode, consuming the one-shot flag.
    ///
    /// The flag is always cleared, even when the query already selects
    /// gallery mode.
    pub fn resolve(&self) -> EntryMode {
        let flagged = self
            .gallery_flag
            .as_ref()
            .map(OneShotFlag::take)
            .unwrap_or(false);
        let queried = self.query.as_deref().map(query_selects_gallery).unwrap_or(false);

        let mode = if flagged || queried {
            EntryMode::Gallery
        } else {
            EntryMode::Camera
        };
        log::debug!(
            "entry mode {:?} (query: {}, flag: {})",
            mode,
            queried,
            flagged
        );
        mode
    }
}

fn query_selects_gallery(query: &str) -> bool {
    let query = query.trim_start_matches('?');
    url::form_urlencoded::parse(query.as_bytes()).any(|(key, value)| {
        let value = value.to_ascii_lowercase();
        (MODE_KEYS.contains(&&*key) && value == "gallery")
            || (&*key == "gallery" && matches!(value.as_str(), "1" | "true"))
    })
}
