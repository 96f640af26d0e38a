pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::seq::SliceRandom;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    collections::HashSet,
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use codedrill::config::{Config, ConfigStore, FileConfigStore};
use codedrill::content::{self, Lesson};
use codedrill::language::{Difficulty, Language};
use codedrill::practice::PracticeSession;
use codedrill::profile::{self, ProfileSummary};
use codedrill::runtime::{AppEvent, AppEventSource, CrosstermEventSource, Runner};
use codedrill::store::{LessonCompletion, PersistenceGateway, SqliteStore};

use crate::ui::theme::Theme;
use crate::ui::MOTIVATIONAL_QUOTES;

const TICK_RATE_MS: u64 = 100;

/// interactive coding lessons and typing practice in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Learn C, C++, Python, Java, and JavaScript in the terminal: structured lessons with runnable examples, a typing-speed trainer fed by real code snippets, and a local profile tracking accuracy, speed, and daily streaks."
)]
pub struct Cli {
    /// language to practice
    #[clap(short = 'l', long, value_enum)]
    language: Option<Language>,

    /// snippet difficulty
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// email identifying the local profile
    #[clap(short = 'u', long)]
    user: Option<String>,

    /// write the session history as CSV to PATH and exit
    #[clap(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Lessons,
    Typing,
    Profile,
}

/// Lessons page state: the list for one language plus selection and the
/// completed-id set folded from the persisted events.
#[derive(Debug)]
pub struct LessonsView {
    pub language: Language,
    pub lessons: Vec<Lesson>,
    pub selected: usize,
    pub expanded: bool,
    pub completed: HashSet<String>,
}

impl LessonsView {
    fn empty(language: Language) -> Self {
        Self {
            language,
            lessons: Vec::new(),
            selected: 0,
            expanded: false,
            completed: HashSet::new(),
        }
    }
}

pub struct App {
    pub page: Page,
    pub home_selected: usize,
    pub session: PracticeSession,
    pub lessons: LessonsView,
    pub profile: Option<ProfileSummary>,
    pub theme: Theme,
    pub quote: &'static str,
    pub config: Config,
    pub store: SqliteStore,
    config_store: FileConfigStore,
    should_quit: bool,
}

impl App {
    pub const HOME_ENTRIES: [&'static str; 7] = [
        "C",
        "C++",
        "Python",
        "Java",
        "JavaScript",
        "Typing Practice",
        "Profile",
    ];

    pub fn new(config: Config, store: SqliteStore, config_store: FileConfigStore) -> Self {
        let quote = MOTIVATIONAL_QUOTES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(MOTIVATIONAL_QUOTES[0]);

        Self {
            page: Page::Home,
            home_selected: 0,
            session: PracticeSession::new(
                config.language,
                config.difficulty,
                config.user_email.clone(),
            ),
            lessons: LessonsView::empty(config.language),
            profile: None,
            theme: Theme::new(config.dark_mode),
            quote,
            config,
            store,
            config_store,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn open_lessons(&mut self, language: Language) {
        let completed =
            profile::completed_lesson_ids(&self.store, language, &self.config.user_email)
                .unwrap_or_else(|err| {
                    eprintln!("codedrill: failed to load lesson progress: {err}");
                    HashSet::new()
                });
        self.lessons = LessonsView {
            language,
            lessons: content::lessons(language),
            selected: 0,
            expanded: false,
            completed,
        };
        self.page = Page::Lessons;
    }

    pub fn open_profile(&mut self) {
        match ProfileSummary::load(&self.store, &self.config.user_email) {
            Ok(summary) => self.profile = Some(summary),
            Err(err) => {
                eprintln!("codedrill: failed to load profile: {err}");
                self.profile = None;
            }
        }
        self.page = Page::Profile;
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.config.dark_mode = self.theme.dark;
        if let Err(err) = self.config_store.save(&self.config) {
            eprintln!("codedrill: failed to save config: {err}");
        }
    }

    fn mark_selected_lesson_complete(&mut self) {
        let Some(lesson) = self.lessons.lessons.get(self.lessons.selected) else {
            return;
        };
        if self.lessons.completed.contains(&lesson.id) {
            return;
        }
        let event = LessonCompletion {
            user_email: self.config.user_email.clone(),
            language: self.lessons.language,
            lesson_id: lesson.id.clone(),
            completed: true,
            created: chrono::Local::now(),
        };
        match self.store.record_lesson_completion(&event) {
            Ok(()) => {
                self.lessons.completed.insert(event.lesson_id);
            }
            Err(err) => eprintln!("codedrill: failed to record lesson completion: {err}"),
        }
    }

    fn set_practice_parameters(&mut self, language: Language, difficulty: Difficulty) {
        self.session.change_parameters(language, difficulty);
        self.config.language = language;
        self.config.difficulty = difficulty;
        if let Err(err) = self.config_store.save(&self.config) {
            eprintln!("codedrill: failed to save config: {err}");
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => self.session.on_tick(),
            AppEvent::Key(key) => self.handle_key(key),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.page {
            Page::Home => self.handle_home_key(key),
            Page::Lessons => self.handle_lessons_key(key),
            Page::Typing => self.handle_typing_key(key),
            Page::Profile => match key.code {
                KeyCode::Esc | KeyCode::Backspace => self.page = Page::Home,
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('m') => self.toggle_theme(),
                _ => {}
            },
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.home_selected = self.home_selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.home_selected = (self.home_selected + 1).min(Self::HOME_ENTRIES.len() - 1);
            }
            KeyCode::Enter => match self.home_selected {
                idx if idx < Language::ALL.len() => self.open_lessons(Language::ALL[idx]),
                5 => self.page = Page::Typing,
                _ => self.open_profile(),
            },
            KeyCode::Char('m') => self.toggle_theme(),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_lessons_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.lessons.selected = self.lessons.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.lessons.lessons.len().saturating_sub(1);
                self.lessons.selected = (self.lessons.selected + 1).min(last);
            }
            KeyCode::Enter => self.lessons.expanded = !self.lessons.expanded,
            KeyCode::Char('c') => self.mark_selected_lesson_complete(),
            KeyCode::Char('l') => {
                let next = self.lessons.language.cycle();
                self.open_lessons(next);
            }
            KeyCode::Char('m') => self.toggle_theme(),
            KeyCode::Esc | KeyCode::Char('q') => self.page = Page::Home,
            _ => {}
        }
    }

    fn handle_typing_key(&mut self, key: KeyEvent) {
        if self.session.is_active() {
            match key.code {
                KeyCode::Esc => self.session.reset(),
                KeyCode::Backspace => self.session.backspace(&self.store),
                KeyCode::Enter => self.session.type_char('\n', &self.store),
                KeyCode::Tab => {
                    // Catalog snippets indent with four spaces
                    for _ in 0..4 {
                        self.session.type_char(' ', &self.store);
                    }
                }
                KeyCode::Char(c) => self.session.type_char(c, &self.store),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('s') if !self.session.is_complete() => self.session.start(),
            KeyCode::Char('r') if self.session.is_complete() => self.session.start(),
            KeyCode::Char('l') => {
                let next = self.session.language().cycle();
                self.set_practice_parameters(next, self.session.difficulty());
            }
            KeyCode::Char('d') => {
                let next = self.session.difficulty().cycle();
                self.set_practice_parameters(self.session.language(), next);
            }
            KeyCode::Char('m') => self.toggle_theme(),
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                self.session.reset();
                self.page = Page::Home;
            }
            _ => {}
        }
    }

    /// In-memory store plus a per-test config directory; hold the returned
    /// `TempDir` for the app's lifetime.
    #[cfg(test)]
    pub fn new_in_memory() -> Result<(App, tempfile::TempDir), codedrill::store::StoreError> {
        let store = SqliteStore::open_in_memory()?;
        let dir = tempfile::tempdir()?;
        let config_store = FileConfigStore::with_path(dir.path().join("config.json"));
        Ok((Self::new(Config::default(), store, config_store), dir))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    if let Some(language) = cli.language {
        config.language = language;
    }
    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(user) = cli.user.clone() {
        config.user_email = user;
    }

    let store = SqliteStore::new()?;

    // Headless export path, no terminal required
    if let Some(path) = cli.export_csv.as_ref() {
        let rows = store.export_csv(&config.user_email, path)?;
        println!("exported {} sessions to {}", rows, path.display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, store, config_store);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let result = run_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_tui<B: Backend, E: AppEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        // A dead input source means the terminal is gone; stop cleanly
        let Some(event) = runner.step() else {
            break;
        };
        app.handle_event(event);

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
