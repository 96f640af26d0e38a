//! The practice session state machine: idle → active → complete, driving the
//! timer and the metric calculator, and handing finished sessions to the
//! persistence gateway.

use chrono::Local;

use crate::content::{self, PracticeSnippet};
use crate::language::{Difficulty, Language};
use crate::metrics;
use crate::store::{PersistenceGateway, SessionRecord, StoreError, UserStatsDelta};
use crate::timer::SessionTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No attempt in progress; input is disabled.
    Idle,
    /// Timer running, input accepted, live stats displayed.
    Active,
    /// Terminal for this attempt; input frozen, final stats shown.
    Complete,
}

/// Final stats for one completed attempt. Created exactly once, at the
/// moment the typed buffer equals the snippet text; immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub language: Language,
    pub difficulty: Difficulty,
    pub snippet_text: String,
    pub elapsed_secs: u64,
    pub accuracy: u8,
    pub wpm: u32,
}

/// One practice attempt. Owned exclusively by the practice page; reset on
/// user request or when the language/difficulty selection changes.
#[derive(Debug)]
pub struct PracticeSession {
    pub snippet: PracticeSnippet,
    pub input: String,
    pub status: SessionStatus,
    /// Live elapsed display, refreshed on tick; frozen once complete.
    pub elapsed_secs: u64,
    pub live_accuracy: u8,
    pub live_wpm: u32,
    pub result: Option<SessionResult>,
    user_email: String,
    timer: SessionTimer,
}

impl PracticeSession {
    pub fn new(language: Language, difficulty: Difficulty, user_email: String) -> Self {
        Self {
            snippet: content::snippet(language, difficulty),
            input: String::new(),
            status: SessionStatus::Idle,
            elapsed_secs: 0,
            live_accuracy: 0,
            live_wpm: 0,
            result: None,
            user_email,
            timer: SessionTimer::new(),
        }
    }

    pub fn language(&self) -> Language {
        self.snippet.language
    }

    pub fn difficulty(&self) -> Difficulty {
        self.snippet.difficulty
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Complete
    }

    /// idle → active: clears the buffer and starts the clock.
    pub fn start(&mut self) {
        self.input.clear();
        self.result = None;
        self.elapsed_secs = 0;
        self.live_accuracy = 0;
        self.live_wpm = 0;
        self.timer.start();
        self.status = SessionStatus::Active;
    }

    /// Refresh the elapsed display while active. Cosmetic; the authoritative
    /// completion time is computed once in `complete()`.
    pub fn on_tick(&mut self) {
        if self.is_active() {
            self.elapsed_secs = self.timer.elapsed_secs();
            self.live_wpm = metrics::words_per_minute(&self.input, self.elapsed_secs);
        }
    }

    /// Replace the buffer with `value`, recompute live stats, and finalize
    /// the attempt when the buffer matches the snippet exactly. Ignored
    /// outside `Active` (input is disabled in the other states).
    pub fn on_input(&mut self, value: &str, gateway: &dyn PersistenceGateway) {
        if !self.is_active() {
            return;
        }

        self.input.clear();
        self.input.push_str(value);
        self.elapsed_secs = self.timer.elapsed_secs();
        self.live_accuracy = metrics::accuracy(&self.snippet.text, &self.input);
        self.live_wpm = metrics::words_per_minute(&self.input, self.elapsed_secs);

        if self.input == self.snippet.text {
            self.complete(gateway);
        }
    }

    /// Append one typed character. Convenience for key-event input.
    pub fn type_char(&mut self, c: char, gateway: &dyn PersistenceGateway) {
        if !self.is_active() {
            return;
        }
        let mut next = self.input.clone();
        next.push(c);
        self.on_input(&next, gateway);
    }

    /// Delete the last typed character.
    pub fn backspace(&mut self, gateway: &dyn PersistenceGateway) {
        if !self.is_active() || self.input.is_empty() {
            return;
        }
        let mut next = self.input.clone();
        next.pop();
        self.on_input(&next, gateway);
    }

    /// Unconditional return to idle; discards buffer, timer, and stats.
    /// Idempotent. An in-flight persistence call is not cancelled.
    pub fn reset(&mut self) {
        self.input.clear();
        self.result = None;
        self.elapsed_secs = 0;
        self.live_accuracy = 0;
        self.live_wpm = 0;
        self.timer.clear();
        self.status = SessionStatus::Idle;
    }

    /// Re-select the snippet and force a reset. The UI disables the
    /// selectors while active, but the state machine tolerates the call in
    /// any state.
    pub fn change_parameters(&mut self, language: Language, difficulty: Difficulty) {
        self.snippet = content::snippet(language, difficulty);
        self.reset();
    }

    /// Entry to `Complete`: snapshot the final stats, build the result, and
    /// hand it to the gateway. The gateway call is fire-and-forget: one
    /// attempt, failure logged, completion never rolled back.
    fn complete(&mut self, gateway: &dyn PersistenceGateway) {
        let elapsed_secs = self.timer.elapsed_secs();
        let result = SessionResult {
            language: self.snippet.language,
            difficulty: self.snippet.difficulty,
            snippet_text: self.snippet.text.clone(),
            elapsed_secs,
            accuracy: metrics::accuracy(&self.snippet.text, &self.input),
            wpm: metrics::words_per_minute(&self.input, elapsed_secs),
        };

        self.status = SessionStatus::Complete;
        self.elapsed_secs = elapsed_secs;
        self.live_accuracy = result.accuracy;
        self.live_wpm = result.wpm;

        if let Err(err) = self.persist(&result, gateway) {
            eprintln!("codedrill: failed to save session: {err}");
        }

        self.result = Some(result);
    }

    fn persist(
        &self,
        result: &SessionResult,
        gateway: &dyn PersistenceGateway,
    ) -> Result<(), StoreError> {
        let now = Local::now();
        let user = gateway.current_user(&self.user_email)?;

        gateway.create_session(&SessionRecord::from_result(result, &self.user_email, now))?;

        let delta = UserStatsDelta::derive(&user, result, now.date_naive());
        gateway.update_user_stats(&self.user_email, &delta)?;

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn backdate_start(&mut self, secs: u64) {
        self.timer.backdate(secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LessonCompletion, SessionRecord, UserAccount};
    use assert_matches::assert_matches;
    use std::cell::RefCell;

    /// In-memory gateway fake; optionally fails every write.
    struct FakeGateway {
        sessions: RefCell<Vec<SessionRecord>>,
        deltas: RefCell<Vec<UserStatsDelta>>,
        fail_writes: bool,
    }

    impl FakeGateway {
        fn new() -> Self {
            Self {
                sessions: RefCell::new(Vec::new()),
                deltas: RefCell::new(Vec::new()),
                fail_writes: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::new()
            }
        }

        fn io_error() -> StoreError {
            StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "gateway down"))
        }
    }

    impl PersistenceGateway for FakeGateway {
        fn current_user(&self, email: &str) -> Result<UserAccount, StoreError> {
            Ok(UserAccount {
                email: email.to_string(),
                full_name: "test".to_string(),
                total_practice_time: 120,
                accuracy_average: 80,
                last_active: None,
                current_streak: 0,
            })
        }

        fn update_user_stats(&self, _email: &str, delta: &UserStatsDelta) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(Self::io_error());
            }
            self.deltas.borrow_mut().push(delta.clone());
            Ok(())
        }

        fn create_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(Self::io_error());
            }
            self.sessions.borrow_mut().push(record.clone());
            Ok(())
        }

        fn sessions_for(&self, _email: &str) -> Result<Vec<SessionRecord>, StoreError> {
            Ok(self.sessions.borrow().clone())
        }

        fn record_lesson_completion(&self, _event: &LessonCompletion) -> Result<(), StoreError> {
            Ok(())
        }

        fn lesson_progress(
            &self,
            _language: Language,
            _email: &str,
        ) -> Result<Vec<LessonCompletion>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn new_session() -> PracticeSession {
        PracticeSession::new(
            Language::Python,
            Difficulty::Easy,
            "ada@example.com".to_string(),
        )
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = new_session();
        assert_matches!(session.status, SessionStatus::Idle);
        assert!(session.input.is_empty());
        assert_eq!(session.elapsed_secs, 0);
        assert_eq!(session.result, None);
    }

    #[test]
    fn test_start_transitions_to_active_with_clean_state() {
        let mut session = new_session();
        session.start();

        assert_matches!(session.status, SessionStatus::Active);
        assert!(session.input.is_empty());
        assert_eq!(session.elapsed_secs, 0);
        assert_eq!(session.live_accuracy, 0);
        assert_eq!(session.live_wpm, 0);
    }

    #[test]
    fn test_input_ignored_while_idle() {
        let gateway = FakeGateway::new();
        let mut session = new_session();

        session.on_input("anything", &gateway);
        assert!(session.input.is_empty());
        assert_matches!(session.status, SessionStatus::Idle);
    }

    #[test]
    fn test_partial_match_stays_active() {
        let gateway = FakeGateway::new();
        let mut session = new_session();
        session.start();

        let text = session.snippet.text.clone();
        session.on_input(&text[..text.len() - 1], &gateway);

        // 99% prefix is still not completion
        assert_matches!(session.status, SessionStatus::Active);
        assert!(session.live_accuracy < 100);
        assert!(gateway.sessions.borrow().is_empty());
    }

    #[test]
    fn test_exact_match_completes_and_persists() {
        let gateway = FakeGateway::new();
        let mut session = new_session();
        session.start();
        session.backdate_start(10);

        let target = session.snippet.text.clone();
        session.on_input(&target, &gateway);

        assert_matches!(session.status, SessionStatus::Complete);
        let result = session.result.clone().expect("result must exist");
        assert_eq!(result.accuracy, 100);
        assert_eq!(result.elapsed_secs, 10);
        assert_eq!(result.snippet_text, target);

        let saved = gateway.sessions.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].user_email, "ada@example.com");
        assert_eq!(saved[0].accuracy, 100);

        // Delta carries the two-point average against the prior 80
        let deltas = gateway.deltas.borrow();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].new_accuracy_average, 90);
        assert_eq!(deltas[0].practice_time_increment, 10);
    }

    #[test]
    fn test_final_stats_are_snapshots() {
        let gateway = FakeGateway::new();
        let mut session = new_session();
        session.start();
        session.backdate_start(10);

        let target = session.snippet.text.clone();
        session.on_input(&target, &gateway);
        let frozen = (session.live_accuracy, session.live_wpm, session.elapsed_secs);

        // Input is disabled in Complete; stray events must not change anything
        session.on_input("garbage", &gateway);
        session.type_char('x', &gateway);
        session.on_tick();

        assert_eq!(
            (session.live_accuracy, session.live_wpm, session.elapsed_secs),
            frozen
        );
        assert_eq!(session.input, target);
        assert_eq!(gateway.sessions.borrow().len(), 1);
    }

    #[test]
    fn test_persistence_failure_does_not_roll_back_completion() {
        let gateway = FakeGateway::failing();
        let mut session = new_session();
        session.start();
        session.backdate_start(5);

        let target = session.snippet.text.clone();
        session.on_input(&target, &gateway);

        // Completed locally; the display stats stand even though the write failed
        assert_matches!(session.status, SessionStatus::Complete);
        assert_eq!(session.result.as_ref().unwrap().accuracy, 100);

        // And a new attempt can start immediately
        session.reset();
        session.start();
        assert_matches!(session.status, SessionStatus::Active);
    }

    #[test]
    fn test_reset_is_unconditional_and_idempotent() {
        let gateway = FakeGateway::new();
        let mut session = new_session();
        session.start();
        session.on_input("partial", &gateway);

        session.reset();
        assert_matches!(session.status, SessionStatus::Idle);
        assert!(session.input.is_empty());
        assert_eq!(session.elapsed_secs, 0);

        // reset from idle is a no-op
        session.reset();
        assert_matches!(session.status, SessionStatus::Idle);
        assert!(session.input.is_empty());
    }

    #[test]
    fn test_change_parameters_forces_idle_from_any_state() {
        let gateway = FakeGateway::new();
        let mut session = new_session();
        session.start();
        session.on_input("def fac", &gateway);
        assert_matches!(session.status, SessionStatus::Active);

        session.change_parameters(Language::Java, Difficulty::Hard);

        assert_matches!(session.status, SessionStatus::Idle);
        assert!(session.input.is_empty());
        assert_eq!(session.language(), Language::Java);
        assert_eq!(session.difficulty(), Difficulty::Hard);
        assert_eq!(session.snippet, content::snippet(Language::Java, Difficulty::Hard));
    }

    #[test]
    fn test_change_parameters_from_complete() {
        let gateway = FakeGateway::new();
        let mut session = new_session();
        session.start();
        let target = session.snippet.text.clone();
        session.on_input(&target, &gateway);
        assert_matches!(session.status, SessionStatus::Complete);

        session.change_parameters(Language::C, Difficulty::Medium);
        assert_matches!(session.status, SessionStatus::Idle);
        assert_eq!(session.result, None);
    }

    #[test]
    fn test_live_stats_track_input() {
        let gateway = FakeGateway::new();
        let mut session = new_session();
        session.start();
        session.backdate_start(30);

        let half = session.snippet.text.chars().count() / 2;
        let prefix: String = session.snippet.text.chars().take(half).collect();
        session.on_input(&prefix, &gateway);

        let expected = metrics::accuracy(&session.snippet.text, &prefix);
        assert_eq!(session.live_accuracy, expected);
        assert!(expected > 0 && expected < 100);
        assert!(session.live_wpm > 0);
    }

    #[test]
    fn test_type_char_and_backspace_drive_the_buffer() {
        let gateway = FakeGateway::new();
        let mut session = new_session();
        session.start();

        session.type_char('p', &gateway);
        session.type_char('r', &gateway);
        session.type_char('x', &gateway);
        assert_eq!(session.input, "prx");

        session.backspace(&gateway);
        assert_eq!(session.input, "pr");

        // backspace on an empty buffer is a no-op
        session.backspace(&gateway);
        session.backspace(&gateway);
        session.backspace(&gateway);
        assert!(session.input.is_empty());
        assert_matches!(session.status, SessionStatus::Active);
    }

    #[test]
    fn test_completion_via_type_char() {
        let gateway = FakeGateway::new();
        let mut session = new_session();
        session.start();
        session.backdate_start(8);

        let target = session.snippet.text.clone();
        for c in target.chars() {
            session.type_char(c, &gateway);
        }

        assert_matches!(session.status, SessionStatus::Complete);
        assert_eq!(gateway.sessions.borrow().len(), 1);
    }

    #[test]
    fn test_on_tick_refreshes_elapsed_only_while_active() {
        let mut session = new_session();
        session.on_tick();
        assert_eq!(session.elapsed_secs, 0);

        session.start();
        session.backdate_start(7);
        session.on_tick();
        assert_eq!(session.elapsed_secs, 7);
    }
}
