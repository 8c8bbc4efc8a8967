//! Haptic/feedback collaborator port
//!
//! The host platform exposes a small set of discrete feedback categories;
//! the game fires them at defined moments (scoring, milestones, pickups,
//! death) and never waits on them.

/// Discrete feedback categories offered by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    ImpactLight,
    ImpactMedium,
    NotifySuccess,
    NotifyWarning,
    NotifyError,
    SelectionChanged,
}

/// Fire-and-forget feedback sink.
pub trait Feedback {
    fn emit(&self, kind: FeedbackKind);
}

/// Swallows everything.
pub struct NullFeedback;

impl Feedback for NullFeedback {
    fn emit(&self, _kind: FeedbackKind) {}
}

/// Debug-log sink used by the terminal front-end, which has no haptics.
pub struct LogFeedback;

impl Feedback for LogFeedback {
    fn emit(&self, kind: FeedbackKind) {
        log::debug!("feedback: {kind:?}");
    }
}
