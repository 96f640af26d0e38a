use chrono::Local;
use itertools::Itertools;
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::language::Language;
use crate::metrics;
use crate::store::{PersistenceGateway, SessionRecord, StoreError, UserAccount};

/// Streak badge tier, from the day-streak thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakBadge {
    pub icon: &'static str,
    pub label: &'static str,
}

pub fn streak_badge(streak: u32) -> StreakBadge {
    if streak >= 30 {
        StreakBadge { icon: "🏆", label: "Master Coder" }
    } else if streak >= 14 {
        StreakBadge { icon: "🔥", label: "On Fire" }
    } else if streak >= 7 {
        StreakBadge { icon: "⚡", label: "Rising Star" }
    } else if streak >= 3 {
        StreakBadge { icon: "✨", label: "Getting Started" }
    } else {
        StreakBadge { icon: "🌱", label: "Beginner" }
    }
}

/// Everything the profile page shows, loaded in one pass.
#[derive(Debug)]
pub struct ProfileSummary {
    pub user: UserAccount,
    pub total_practice_minutes: u64,
    pub completed_lessons: usize,
    pub average_wpm: u32,
    /// Newest first.
    pub sessions: Vec<SessionRecord>,
}

impl ProfileSummary {
    pub fn load(gateway: &dyn PersistenceGateway, email: &str) -> Result<Self, StoreError> {
        let user = gateway.current_user(email)?;

        let sessions: Vec<SessionRecord> = gateway
            .sessions_for(email)?
            .into_iter()
            .sorted_by(|a, b| b.created.cmp(&a.created))
            .collect();

        let average_wpm = metrics::mean(
            &sessions.iter().map(|s| s.wpm as f64).collect::<Vec<_>>(),
        )
        .map(|avg| avg.round() as u32)
        .unwrap_or(0);

        let mut completed_lessons = 0;
        for language in Language::ALL {
            completed_lessons += completed_lesson_ids(gateway, language, email)?.len();
        }

        Ok(Self {
            total_practice_minutes: ((user.total_practice_time as f64) / 60.0).round() as u64,
            completed_lessons,
            average_wpm,
            sessions,
            user,
        })
    }

    pub fn badge(&self) -> StreakBadge {
        streak_badge(self.user.current_streak)
    }

    /// "3 days ago" style rendering of the last-active date.
    pub fn last_active_humanized(&self) -> String {
        match self.user.last_active {
            Some(date) => {
                let days = (Local::now().date_naive() - date).num_days().max(0) as u64;
                if days == 0 {
                    "today".to_string()
                } else {
                    HumanTime::from(std::time::Duration::from_secs(days * 24 * 3600))
                        .to_text_en(Accuracy::Rough, Tense::Past)
                }
            }
            None => "never".to_string(),
        }
    }
}

/// Distinct completed lesson ids for one language, folded from the
/// append-only completion events.
pub fn completed_lesson_ids(
    gateway: &dyn PersistenceGateway,
    language: Language,
    email: &str,
) -> Result<std::collections::HashSet<String>, StoreError> {
    Ok(gateway
        .lesson_progress(language, email)?
        .into_iter()
        .filter(|event| event.completed)
        .map(|event| event.lesson_id)
        .collect())
}
