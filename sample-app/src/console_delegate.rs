use serde::Serialize;

use photo_capture_core::{CaptureDelegate, CaptureError, Navigation, SessionPhase};

/// CaptureDelegate that writes session events to stderr as JSON lines.
pub struct ConsoleDelegate;

// -- Event payloads --

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    PhaseChanged { phase: &'a str },
    Error { message: String, device: bool },
    Navigate { target: &'a str },
}

impl ConsoleDelegate {
    fn emit(&self, event: Event<'_>) {
        match serde_json::to_string(&event) {
            Ok(line) => eprintln!("{}", line),
            Err(e) => log::warn!("failed to serialize event: {}", e),
        }
    }
}

impl CaptureDelegate for ConsoleDelegate {
    fn on_phase_changed(&self, phase: &SessionPhase) {
        self.emit(Event::PhaseChanged {
            phase: phase.name(),
        });
    }

    fn on_error(&self, error: &CaptureError) {
        self.emit(Event::Error {
            message: error.user_message(),
            device: error.is_device_error(),
        });
    }

    fn on_navigate(&self, navigation: &Navigation) {
        let target = match navigation {
            Navigation::Results(_) => "results",
            Navigation::Back => "back",
        };
        self.emit(Event::Navigate { target });
    }
}
