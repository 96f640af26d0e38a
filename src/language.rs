use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Languages covered by the lesson and snippet catalogs.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    strum_macros::Display,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
    Python,
    Java,
    #[value(name = "javascript")]
    #[serde(rename = "javascript")]
    JavaScript,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::C,
        Language::Cpp,
        Language::Python,
        Language::Java,
        Language::JavaScript,
    ];

    /// Stable identifier used as a catalog and database key.
    pub fn id(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Python => "python",
            Language::Java => "java",
            Language::JavaScript => "javascript",
        }
    }

    pub fn from_id(id: &str) -> Option<Language> {
        Language::ALL.iter().copied().find(|l| l.id() == id)
    }

    /// Human-facing name shown in the UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::JavaScript => "JavaScript",
        }
    }

    pub fn tagline(&self) -> &'static str {
        match self {
            Language::C => "Master the foundation of programming",
            Language::Cpp => "Object-oriented power on top of C",
            Language::Python => "Versatile and beginner-friendly",
            Language::Java => "Write once, run anywhere",
            Language::JavaScript => "Power of the modern web",
        }
    }
}

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    strum_macros::Display,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn id(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_id(id: &str) -> Option<Difficulty> {
        Difficulty::ALL.iter().copied().find(|d| d.id() == id)
    }

    /// Next difficulty, wrapping around. Used by the selector keybinding.
    pub fn cycle(&self) -> Difficulty {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

impl Language {
    /// Next language, wrapping around. Used by the selector keybinding.
    pub fn cycle(&self) -> Language {
        match self {
            Language::C => Language::Cpp,
            Language::Cpp => Language::Python,
            Language::Python => Language::Java,
            Language::Java => Language::JavaScript,
            Language::JavaScript => Language::C,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_id(lang.id()), Some(lang));
        }
        for diff in Difficulty::ALL {
            assert_eq!(Difficulty::from_id(diff.id()), Some(diff));
        }
    }

    #[test]
    fn test_from_id_unknown() {
        assert_eq!(Language::from_id("rust"), None);
        assert_eq!(Difficulty::from_id("extreme"), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Language::Cpp.display_name(), "C++");
        assert_eq!(Language::JavaScript.display_name(), "JavaScript");
    }

    #[test]
    fn test_cycle_covers_all_languages() {
        let mut lang = Language::C;
        let mut seen = vec![lang];
        for _ in 0..4 {
            lang = lang.cycle();
            seen.push(lang);
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(lang.cycle(), Language::C);
    }

    #[test]
    fn test_difficulty_cycle() {
        assert_eq!(Difficulty::Easy.cycle(), Difficulty::Medium);
        assert_eq!(Difficulty::Hard.cycle(), Difficulty::Easy);
    }

    #[test]
    fn test_serde_ids_match_catalog_keys() {
        let json = serde_json::to_string(&Language::JavaScript).unwrap();
        assert_eq!(json, "\"javascript\"");
        let back: Language = serde_json::from_str("\"cpp\"").unwrap();
        assert_eq!(back, Language::Cpp);
    }
}
