use chrono::{DateTime, Duration, Local, NaiveDate};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::language::{Difficulty, Language};
use crate::practice::SessionResult;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// The per-user aggregate the dashboard reads and session completion updates.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub email: String,
    pub full_name: String,
    /// Lifetime practice time in seconds.
    pub total_practice_time: u64,
    pub accuracy_average: u8,
    pub last_active: Option<NaiveDate>,
    pub current_streak: u32,
}

/// A finished practice session as persisted: the session result plus the
/// owning user and a creation timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub user_email: String,
    pub language: Language,
    pub difficulty: Difficulty,
    pub snippet_text: String,
    pub elapsed_secs: u64,
    pub accuracy: u8,
    pub wpm: u32,
    pub created: DateTime<Local>,
}

impl SessionRecord {
    pub fn from_result(result: &SessionResult, user_email: &str, created: DateTime<Local>) -> Self {
        Self {
            user_email: user_email.to_string(),
            language: result.language,
            difficulty: result.difficulty,
            snippet_text: result.snippet_text.clone(),
            elapsed_secs: result.elapsed_secs,
            accuracy: result.accuracy,
            wpm: result.wpm,
            created,
        }
    }
}

/// Append-only lesson completion event.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonCompletion {
    pub user_email: String,
    pub language: Language,
    pub lesson_id: String,
    pub completed: bool,
    pub created: DateTime<Local>,
}

/// Aggregate update derived from one completed session.
///
/// `new_accuracy_average` is the literal two-point average of the prior
/// average and this session's accuracy; the most recent session always
/// weighs 50% regardless of history length.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStatsDelta {
    pub practice_time_increment: u64,
    pub new_accuracy_average: u8,
    pub last_active: NaiveDate,
}

impl UserStatsDelta {
    pub fn derive(prior: &UserAccount, result: &SessionResult, today: NaiveDate) -> Self {
        let new_accuracy_average =
            ((prior.accuracy_average as f64 + result.accuracy as f64) / 2.0).round() as u8;
        Self {
            practice_time_increment: result.elapsed_secs,
            new_accuracy_average,
            last_active: today,
        }
    }
}

/// Persistence boundary. The auth group covers the user aggregate, the
/// entities group covers session records and lesson progress; a fake
/// implementation stands in for the whole backend in tests.
pub trait PersistenceGateway {
    // auth
    fn current_user(&self, email: &str) -> Result<UserAccount, StoreError>;
    fn update_user_stats(&self, email: &str, delta: &UserStatsDelta) -> Result<(), StoreError>;

    // entities
    fn create_session(&self, record: &SessionRecord) -> Result<(), StoreError>;
    fn sessions_for(&self, email: &str) -> Result<Vec<SessionRecord>, StoreError>;
    fn record_lesson_completion(&self, event: &LessonCompletion) -> Result<(), StoreError>;
    fn lesson_progress(
        &self,
        language: Language,
        email: &str,
    ) -> Result<Vec<LessonCompletion>, StoreError>;
}

/// Local SQLite-backed gateway.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

const DATE_FMT: &str = "%Y-%m-%d";

impl SqliteStore {
    /// Open (and if needed bootstrap) the store under the app state dir.
    pub fn new() -> Result<Self, StoreError> {
        let db_path = crate::app_dirs::AppDirs::db_path()
            .unwrap_or_else(|| PathBuf::from("codedrill.db"));

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        Self::with_connection(conn)
    }

    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                email TEXT PRIMARY KEY,
                full_name TEXT NOT NULL,
                total_practice_time INTEGER NOT NULL DEFAULT 0,
                accuracy_average INTEGER NOT NULL DEFAULT 0,
                last_active TEXT,
                current_streak INTEGER NOT NULL DEFAULT 0
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS typing_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_email TEXT NOT NULL,
                language TEXT NOT NULL,
                difficulty TEXT NOT NULL,
                snippet_text TEXT NOT NULL,
                elapsed_secs INTEGER NOT NULL,
                accuracy INTEGER NOT NULL,
                wpm INTEGER NOT NULL,
                created TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS lesson_progress (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_email TEXT NOT NULL,
                language TEXT NOT NULL,
                lesson_id TEXT NOT NULL,
                completed BOOLEAN NOT NULL,
                created TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_user ON typing_sessions(user_email)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_progress_lang_user ON lesson_progress(language, user_email)",
            [],
        )?;

        Ok(SqliteStore { conn })
    }

    /// Streak rule: consecutive-day practice extends it, same-day practice
    /// holds it, any gap resets to 1.
    fn next_streak(prior: &UserAccount, today: NaiveDate) -> u32 {
        match prior.last_active {
            Some(last) if last == today => prior.current_streak.max(1),
            Some(last) if last + Duration::days(1) == today => prior.current_streak + 1,
            _ => 1,
        }
    }

    /// Dump a user's full session history as CSV.
    pub fn export_csv<P: AsRef<Path>>(&self, email: &str, path: P) -> Result<usize, StoreError> {
        let sessions = self.sessions_for(email)?;

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([
            "date",
            "language",
            "difficulty",
            "elapsed_secs",
            "wpm",
            "accuracy",
        ])?;
        for s in &sessions {
            writer.write_record([
                s.created.to_rfc3339(),
                s.language.id().to_string(),
                s.difficulty.id().to_string(),
                s.elapsed_secs.to_string(),
                s.wpm.to_string(),
                s.accuracy.to_string(),
            ])?;
        }
        writer.flush()?;

        Ok(sessions.len())
    }
}

fn parse_language(column: usize, id: &str) -> rusqlite::Result<Language> {
    Language::from_id(id).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(column, "language".to_string(), rusqlite::types::Type::Text)
    })
}

fn parse_difficulty(column: usize, id: &str) -> rusqlite::Result<Difficulty> {
    Difficulty::from_id(id).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(
            column,
            "difficulty".to_string(),
            rusqlite::types::Type::Text,
        )
    })
}

fn parse_created(column: usize, raw: &str) -> rusqlite::Result<DateTime<Local>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(
                column,
                "created".to_string(),
                rusqlite::types::Type::Text,
            )
        })
}

impl PersistenceGateway for SqliteStore {
    fn current_user(&self, email: &str) -> Result<UserAccount, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT email, full_name, total_practice_time, accuracy_average, last_active, current_streak
            FROM users WHERE email = ?1
            "#,
        )?;

        let existing = stmt
            .query_map([email], |row| {
                let last_active: Option<String> = row.get(4)?;
                Ok(UserAccount {
                    email: row.get(0)?,
                    full_name: row.get(1)?,
                    total_practice_time: row.get::<_, i64>(2)? as u64,
                    accuracy_average: row.get::<_, i64>(3)? as u8,
                    last_active: last_active
                        .and_then(|raw| NaiveDate::parse_from_str(&raw, DATE_FMT).ok()),
                    current_streak: row.get::<_, i64>(5)? as u32,
                })
            })?
            .next();

        if let Some(user) = existing {
            return Ok(user?);
        }

        // First sign-in: create the account row with a name derived from the
        // email local part.
        let full_name = email.split('@').next().unwrap_or(email).to_string();
        self.conn.execute(
            "INSERT INTO users (email, full_name) VALUES (?1, ?2)",
            params![email, full_name],
        )?;

        Ok(UserAccount {
            email: email.to_string(),
            full_name,
            total_practice_time: 0,
            accuracy_average: 0,
            last_active: None,
            current_streak: 0,
        })
    }

    fn update_user_stats(&self, email: &str, delta: &UserStatsDelta) -> Result<(), StoreError> {
        let prior = self.current_user(email)?;
        let streak = Self::next_streak(&prior, delta.last_active);

        self.conn.execute(
            r#"
            UPDATE users
            SET total_practice_time = total_practice_time + ?1,
                accuracy_average = ?2,
                last_active = ?3,
                current_streak = ?4
            WHERE email = ?5
            "#,
            params![
                delta.practice_time_increment as i64,
                delta.new_accuracy_average as i64,
                delta.last_active.format(DATE_FMT).to_string(),
                streak as i64,
                email,
            ],
        )?;

        Ok(())
    }

    fn create_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO typing_sessions
            (user_email, language, difficulty, snippet_text, elapsed_secs, accuracy, wpm, created)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.user_email,
                record.language.id(),
                record.difficulty.id(),
                record.snippet_text,
                record.elapsed_secs as i64,
                record.accuracy as i64,
                record.wpm as i64,
                record.created.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn sessions_for(&self, email: &str) -> Result<Vec<SessionRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT user_email, language, difficulty, snippet_text, elapsed_secs, accuracy, wpm, created
            FROM typing_sessions
            WHERE user_email = ?1
            ORDER BY created DESC
            "#,
        )?;

        let rows = stmt.query_map([email], |row| {
            let language: String = row.get(1)?;
            let difficulty: String = row.get(2)?;
            let created: String = row.get(7)?;
            Ok(SessionRecord {
                user_email: row.get(0)?,
                language: parse_language(1, &language)?,
                difficulty: parse_difficulty(2, &difficulty)?,
                snippet_text: row.get(3)?,
                elapsed_secs: row.get::<_, i64>(4)? as u64,
                accuracy: row.get::<_, i64>(5)? as u8,
                wpm: row.get::<_, i64>(6)? as u32,
                created: parse_created(7, &created)?,
            })
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }

        Ok(sessions)
    }

    fn record_lesson_completion(&self, event: &LessonCompletion) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO lesson_progress (user_email, language, lesson_id, completed, created)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                event.user_email,
                event.language.id(),
                event.lesson_id,
                event.completed,
                event.created.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn lesson_progress(
        &self,
        language: Language,
        email: &str,
    ) -> Result<Vec<LessonCompletion>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT user_email, language, lesson_id, completed, created
            FROM lesson_progress
            WHERE language = ?1 AND user_email = ?2
            ORDER BY created
            "#,
        )?;

        let rows = stmt.query_map(params![language.id(), email], |row| {
            let language: String = row.get(1)?;
            let created: String = row.get(4)?;
            Ok(LessonCompletion {
                user_email: row.get(0)?,
                language: parse_language(1, &language)?,
                lesson_id: row.get(2)?,
                completed: row.get(3)?,
                created: parse_created(4, &created)?,
            })
        })?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }

        Ok(events)
    }
}
