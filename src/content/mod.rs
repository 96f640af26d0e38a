//! Static lesson and snippet catalogs, embedded in the binary as JSON.
//!
//! The catalog is closed: every `(language, difficulty)` pair resolves to a
//! snippet and every language has a lesson list, so lookups panic only on a
//! build-time data error, never on user input.

use include_dir::{include_dir, Dir};
use serde::Deserialize;
use std::collections::HashMap;

use crate::language::{Difficulty, Language};

static CONTENT_DIR: Dir = include_dir!("src/content/data");

/// A fixed block of source text used as a typing target.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeSnippet {
    pub language: Language,
    pub difficulty: Difficulty,
    pub text: String,
}

/// One lesson card: theory text plus an example program and its output.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub theory: String,
    pub code: String,
    pub output: String,
}

fn read_embedded_json<T: for<'de> Deserialize<'de>>(path: &str) -> T {
    let file = CONTENT_DIR.get_file(path).expect("Content file not found");
    let contents = file
        .contents_utf8()
        .expect("Unable to interpret content file as a string");
    serde_json::from_str(contents).expect("Unable to deserialize content json")
}

/// Select the snippet for a language/difficulty pair.
pub fn snippet(language: Language, difficulty: Difficulty) -> PracticeSnippet {
    let catalog: HashMap<String, HashMap<String, String>> = read_embedded_json("snippets.json");
    let text = catalog
        .get(language.id())
        .and_then(|per_difficulty| per_difficulty.get(difficulty.id()))
        .expect("Snippet missing from catalog")
        .clone();

    PracticeSnippet {
        language,
        difficulty,
        text,
    }
}

/// The ordered lesson list for a language.
pub fn lessons(language: Language) -> Vec<Lesson> {
    read_embedded_json(&format!("lessons/{}.json", language.id()))
}

/// Completion percentage for `completed` lessons out of a language's catalog.
pub fn completion_percent(language: Language, completed: usize) -> u8 {
    let total = lessons(language).len();
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u8
}
