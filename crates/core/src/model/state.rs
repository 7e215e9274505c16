use crate::model::answer::Answer;
use crate::model::timer::TimerDuration;

/// Snapshot of everything the questionnaire persists between runs.
///
/// This is a plain value: the session controller exclusively owns the live
/// copy, and persistence backends only ever see serialized snapshots of it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    /// 0-based position in the deck, clamped to `[0, deck_len - 1]`.
    pub current_question_index: usize,
    /// Append-only log, in arrival order (not necessarily timestamp order).
    pub answers: Vec<Answer>,
    pub timer_duration: TimerDuration,
}

impl AppState {
    /// Clamps the question index to the deck bounds.
    ///
    /// A persisted index can be out of range when it was written by a build
    /// with a different deck; the snapshot stays usable either way.
    pub fn clamp_index(&mut self, deck_len: usize) {
        if deck_len == 0 {
            self.current_question_index = 0;
        } else if self.current_question_index > deck_len - 1 {
            self.current_question_index = deck_len - 1;
        }
    }
}
