use crate::models::analysis::Navigation;
use crate::models::error::CaptureError;
use crate::models::state::SessionPhase;

/// Event delegate for capture session notifications.
///
/// Called on the task driving the session, never while internal locks are
/// held. Implementations may call back into the session's accessors.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the session phase changes.
    fn on_phase_changed(&self, phase: &SessionPhase);

    /// Called for every error, inline or full-screen.
    fn on_error(&self, error: &CaptureError);

    /// Called once when the session hands control to the navigation layer.
    fn on_navigate(&self, navigation: &Navigation);
}
