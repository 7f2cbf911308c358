use serde::{Deserialize, Serialize};

use devarch_pm::OutputMode;

/// Where a session is in the generate/continue cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    /// No answer yet.
    #[default]
    Idle,
    /// A generate request is in flight.
    Generating,
    /// An answer is available and may be continued.
    Ready,
    /// A continue request is in flight.
    Continuing,
}

/// The last prompt sent and everything answered to it so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    last_prompt: String,
    accumulated_answer: String,
}

impl ConversationState {
    pub fn last_prompt(&self) -> &str {
        &self.last_prompt
    }

    pub fn accumulated_answer(&self) -> &str {
        &self.accumulated_answer
    }

    /// Replace both prompt and answer after a fresh generate.
    pub fn record(&mut self, prompt: impl Into<String>, answer: impl Into<String>) {
        self.last_prompt = prompt.into();
        self.accumulated_answer = answer.into();
    }

    /// Append a continuation, separated from the existing answer by a blank line.
    pub fn append(&mut self, continuation: &str) {
        self.accumulated_answer.push_str("\n\n");
        self.accumulated_answer.push_str(continuation);
    }

    /// A continue action is only meaningful once there is an answer.
    pub fn can_continue(&self) -> bool {
        !self.accumulated_answer.is_empty()
    }

    pub fn clear(&mut self) {
        self.last_prompt.clear();
        self.accumulated_answer.clear();
    }
}

/// One user's session: its conversation state, its phase, and the mode of
/// the last generate. Sessions share nothing with each other.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    state: ConversationState,
    phase: SessionPhase,
    mode: Option<OutputMode>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut ConversationState {
        &mut self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
    }

    /// Mode of the most recent generate, if any.
    pub fn mode(&self) -> Option<OutputMode> {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, mode: OutputMode) {
        self.mode = Some(mode);
    }

    /// End the session: forget the conversation and return to idle.
    pub fn reset(&mut self) {
        self.state.clear();
        self.phase = SessionPhase::Idle;
        self.mode = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_start_empty_and_idle() {
        let session = Session::new();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.mode().is_none());
        assert!(!session.state().can_continue());
        assert_eq!(session.state().last_prompt(), "");
    }

    #[test]
    fn test_should_overwrite_on_record() {
        let mut state = ConversationState::default();
        state.record("p1", "a1");
        state.append("more");
        state.record("p2", "a2");

        assert_eq!(state.last_prompt(), "p2");
        assert_eq!(state.accumulated_answer(), "a2");
    }

    #[test]
    fn test_should_append_with_blank_line() {
        let mut state = ConversationState::default();
        state.record("prompt", "A");
        state.append("B");

        assert_eq!(state.accumulated_answer(), "A\n\nB");
        assert_eq!(state.last_prompt(), "prompt");
    }

    #[test]
    fn test_should_not_continue_empty_answer() {
        let mut state = ConversationState::default();
        state.record("prompt", "");
        assert!(!state.can_continue());
    }

    #[test]
    fn test_should_reset_session() {
        let mut session = Session::new();
        session.state_mut().record("p", "a");
        session.set_phase(SessionPhase::Ready);
        session.set_mode(OutputMode::SreDoc);

        session.reset();

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.mode().is_none());
        assert_eq!(session.state(), &ConversationState::default());
    }
}
