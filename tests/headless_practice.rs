use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use codedrill::language::{Difficulty, Language};
use codedrill::practice::PracticeSession;
use codedrill::runtime::{AppEvent, Runner, TestEventSource};
use codedrill::store::{PersistenceGateway, SqliteStore};

// Headless integration using the internal runtime + PracticeSession without
// a TTY. Drives a full attempt to completion via Runner/TestEventSource and
// checks what lands in the store.
#[test]
fn headless_attempt_completes_and_persists() {
    let store = SqliteStore::open_in_memory().expect("in-memory store");
    let mut session = PracticeSession::new(
        Language::Python,
        Difficulty::Easy,
        "ada@example.com".to_string(),
    );
    session.start();

    let (tx, es) = TestEventSource::channel();
    let runner = Runner::new(es, Duration::from_millis(5));

    // Producer: the exact snippet text as keystrokes
    let target = session.snippet.text.clone();
    for c in target.chars() {
        let code = if c == '\n' {
            KeyCode::Enter
        } else {
            KeyCode::Char(c)
        };
        tx.send(AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .unwrap();
    }

    // Drive a tiny event loop until the attempt finishes (or bounded steps)
    for _ in 0..10_000u32 {
        match runner.step() {
            Some(AppEvent::Tick) => session.on_tick(),
            Some(AppEvent::Key(key)) => match key.code {
                KeyCode::Enter => session.type_char('\n', &store),
                KeyCode::Char(c) => session.type_char(c, &store),
                _ => {}
            },
            None => break,
        }
        if session.is_complete() {
            break;
        }
    }

    assert!(session.is_complete(), "session should have completed");
    let result = session.result.as_ref().expect("result must exist");
    assert_eq!(result.accuracy, 100);
    assert_eq!(result.snippet_text, target);

    // The attempt reached the store, and the profile stats moved with it
    let saved = store.sessions_for("ada@example.com").unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].accuracy, 100);
    assert_eq!(saved[0].language, Language::Python);

    let user = store.current_user("ada@example.com").unwrap();
    assert_eq!(user.accuracy_average, 50); // two-point average from a fresh 0
    assert_eq!(user.current_streak, 1);
}

#[test]
fn headless_typo_then_correction_still_completes() {
    let store = SqliteStore::open_in_memory().expect("in-memory store");
    let mut session = PracticeSession::new(
        Language::C,
        Difficulty::Easy,
        "ada@example.com".to_string(),
    );
    session.start();

    // One wrong character, backspace, then the real text
    session.type_char('z', &store);
    assert!(session.live_accuracy < 100);
    session.backspace(&store);

    let target = session.snippet.text.clone();
    for c in target.chars() {
        session.type_char(c, &store);
    }

    assert!(session.is_complete());
    // Accuracy compares the final buffer, so the corrected typo scores 100
    assert_eq!(session.result.as_ref().unwrap().accuracy, 100);
}

#[test]
fn headless_reset_discards_attempt_without_persisting() {
    let store = SqliteStore::open_in_memory().expect("in-memory store");
    let mut session = PracticeSession::new(
        Language::Java,
        Difficulty::Medium,
        "ada@example.com".to_string(),
    );

    session.start();
    session.type_char('p', &store);
    session.reset();

    assert!(!session.is_active());
    assert!(store.sessions_for("ada@example.com").unwrap().is_empty());
}
