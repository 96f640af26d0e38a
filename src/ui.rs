pub mod theme;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use codedrill::content;
use codedrill::language::Language;
use codedrill::practice::SessionStatus;

use crate::{App, Page};
use self::theme::Theme;

const HORIZONTAL_MARGIN: u16 = 3;
const VERTICAL_MARGIN: u16 = 1;

/// Sidebar quotes from which one is picked at startup.
pub const MOTIVATIONAL_QUOTES: [&str; 6] = [
    "Code is poetry written in logic.",
    "Every expert was once a beginner.",
    "Practice makes progress!",
    "The best way to learn is by doing.",
    "Keep coding, keep growing!",
    "Your only limit is your commitment.",
];

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = Rect {
            x: area.x + HORIZONTAL_MARGIN.min(area.width / 2),
            y: area.y + VERTICAL_MARGIN.min(area.height / 2),
            width: area.width.saturating_sub(HORIZONTAL_MARGIN * 2),
            height: area.height.saturating_sub(VERTICAL_MARGIN * 2),
        };

        match self.page {
            Page::Home => render_home(self, inner, buf),
            Page::Lessons => render_lessons(self, inner, buf),
            Page::Typing => render_typing(self, inner, buf),
            Page::Profile => render_profile(self, inner, buf),
        }
    }
}

fn render_home(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = &app.theme;
    let mut lines = vec![
        Line::from(Span::styled("CodeDrill", theme.title())),
        Line::from(Span::styled(
            "Learn programming, one keystroke at a time",
            theme.muted(),
        )),
        Line::default(),
        Line::from(Span::styled(
            format!("\u{201c}{}\u{201d}", app.quote),
            theme.muted().add_modifier(Modifier::ITALIC),
        )),
        Line::default(),
    ];

    for (idx, entry) in App::HOME_ENTRIES.iter().enumerate() {
        let marker = if idx == app.home_selected { "▸ " } else { "  " };
        let style = if idx == app.home_selected {
            theme.accent().add_modifier(Modifier::BOLD)
        } else {
            theme.text()
        };
        let detail = match Language::ALL.get(idx) {
            Some(language) => format!("  {}", language.tagline()),
            None => String::new(),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{entry}"), style),
            Span::styled(detail, theme.muted()),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!(
            "(↑/↓) select  (enter) open  (m) {} mode  (q)uit",
            theme.toggled().label()
        ),
        theme.muted().add_modifier(Modifier::ITALIC),
    )));

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(area, buf);
}

fn render_lessons(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = &app.theme;
    let view = &app.lessons;
    let percent = content::completion_percent(view.language, view.completed.len());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(view.lessons.len() as u16 + 1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Line::from(Span::styled(
        format!("{} Lessons", view.language.display_name()),
        theme.title(),
    )))
    .render(chunks[0], buf);

    Gauge::default()
        .gauge_style(theme.accent())
        .label(format!("{percent}% complete"))
        .percent(percent as u16)
        .render(chunks[1], buf);

    let mut lines = Vec::new();
    for (idx, lesson) in view.lessons.iter().enumerate() {
        let marker = if idx == view.selected { "▸ " } else { "  " };
        let check = if view.completed.contains(&lesson.id) {
            "[✓] "
        } else {
            "[ ] "
        };
        let style = if idx == view.selected {
            theme.accent().add_modifier(Modifier::BOLD)
        } else {
            theme.text()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{check}{}", lesson.title), style),
            Span::styled(format!("  {}", lesson.description), theme.muted()),
        ]));
    }
    Paragraph::new(lines).render(chunks[2], buf);

    if view.expanded {
        if let Some(lesson) = view.lessons.get(view.selected) {
            let mut detail = vec![Line::from(Span::styled(
                lesson.theory.clone(),
                theme.text(),
            ))];
            detail.push(Line::default());
            for code_line in lesson.code.lines() {
                detail.push(Line::from(Span::styled(
                    code_line.to_string(),
                    theme.accent(),
                )));
            }
            detail.push(Line::default());
            detail.push(Line::from(Span::styled("Output:", theme.muted())));
            for out_line in lesson.output.lines() {
                detail.push(Line::from(Span::styled(
                    out_line.to_string(),
                    theme.success(),
                )));
            }
            Paragraph::new(detail)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(lesson.title.clone()),
                )
                .wrap(Wrap { trim: false })
                .render(chunks[3], buf);
        }
    }

    Paragraph::new(Line::from(Span::styled(
        "(↑/↓) select  (enter) expand  (c) mark complete  (l) language  (esc) back",
        theme.muted().add_modifier(Modifier::ITALIC),
    )))
    .render(chunks[4], buf);
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = &app.theme;
    let session = &app.session;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Line::from(Span::styled("Typing Practice", theme.title())))
        .render(chunks[0], buf);

    // Selectors are inert while a run is active
    let selector_style = if session.is_active() {
        theme.muted().add_modifier(Modifier::DIM)
    } else {
        theme.text()
    };
    Paragraph::new(Line::from(Span::styled(
        format!(
            "(l) Language: {}   (d) Difficulty: {}",
            session.language().display_name(),
            session.difficulty().id()
        ),
        selector_style,
    )))
    .render(chunks[1], buf);

    Paragraph::new(Line::from(Span::styled(
        format!(
            "Time {}s   Accuracy {}%   WPM {}",
            session.elapsed_secs, session.live_accuracy, session.live_wpm
        ),
        theme.text().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let widest = session
        .snippet
        .text
        .lines()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0) as u16;
    let pane = centered_pane(chunks[3], widest + 4);
    Paragraph::new(snippet_lines(&session.snippet.text, &session.input, theme))
        .block(Block::default().borders(Borders::ALL))
        .render(pane, buf);

    let status = match session.status {
        SessionStatus::Idle => Span::styled(
            "Press (s) to start typing",
            theme.muted().add_modifier(Modifier::ITALIC),
        ),
        SessionStatus::Active => Span::styled(
            "Type the snippet exactly; (esc) resets",
            theme.muted().add_modifier(Modifier::ITALIC),
        ),
        SessionStatus::Complete => Span::styled(
            format!(
                "Perfect! Completed in {}s at {} wpm",
                session.elapsed_secs, session.live_wpm
            ),
            theme.success(),
        ),
    };
    Paragraph::new(Line::from(status))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    let hints = match session.status {
        SessionStatus::Complete => "(r)etry  (esc) back",
        SessionStatus::Active => "(esc) reset",
        SessionStatus::Idle => "(s)tart  (l)anguage  (d)ifficulty  (esc) back",
    };
    Paragraph::new(Line::from(Span::styled(
        hints,
        theme.muted().add_modifier(Modifier::ITALIC),
    )))
    .render(chunks[5], buf);
}

fn render_profile(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = &app.theme;
    let mut lines = vec![Line::from(Span::styled("Profile", theme.title()))];

    match &app.profile {
        Some(summary) => {
            let badge = summary.badge();
            lines.push(Line::from(vec![
                Span::styled(
                    summary.user.full_name.clone(),
                    theme.text().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  <{}>", summary.user.email), theme.muted()),
            ]));
            lines.push(Line::from(Span::styled(
                format!(
                    "{} {}   {} day streak   last active {}",
                    badge.icon,
                    badge.label,
                    summary.user.current_streak,
                    summary.last_active_humanized()
                ),
                theme.accent(),
            )));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!(
                    "Practice time: {} min   Avg accuracy: {}%   Avg speed: {} wpm   Lessons done: {}",
                    summary.total_practice_minutes,
                    summary.user.accuracy_average,
                    summary.average_wpm,
                    summary.completed_lessons
                ),
                theme.text(),
            )));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("Recent sessions", theme.title())));
            if summary.sessions.is_empty() {
                lines.push(Line::from(Span::styled(
                    "No sessions yet. Head to Typing Practice!",
                    theme.muted(),
                )));
            }
            for record in summary.sessions.iter().take(8) {
                lines.push(Line::from(Span::styled(
                    format!(
                        "{}  {:<10} {:<6} {:>3} wpm  {:>3}%  {}s",
                        record.created.format("%Y-%m-%d %H:%M"),
                        record.language.display_name(),
                        record.difficulty.id(),
                        record.wpm,
                        record.accuracy,
                        record.elapsed_secs
                    ),
                    theme.text(),
                )));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "Profile unavailable; progress database could not be read",
                theme.error(),
            )));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(esc) back  (q)uit",
        theme.muted().add_modifier(Modifier::ITALIC),
    )));

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(area, buf);
}

/// Per-character coloring of the target against the typed buffer: matched
/// positions green, mismatches red (spaces shown as "·"), the next expected
/// character underlined, the untyped tail dimmed.
fn snippet_lines(target: &str, typed: &str, theme: &Theme) -> Vec<Line<'static>> {
    let typed_chars: Vec<char> = typed.chars().collect();
    let mut lines = Vec::new();
    let mut spans: Vec<Span> = Vec::new();

    for (idx, expected) in target.chars().enumerate() {
        if expected == '\n' {
            lines.push(Line::from(std::mem::take(&mut spans)));
            continue;
        }
        let span = match typed_chars.get(idx) {
            Some(&c) if c == expected => Span::styled(expected.to_string(), theme.success()),
            Some(_) => Span::styled(
                if expected == ' ' {
                    "·".to_string()
                } else {
                    expected.to_string()
                },
                theme.error(),
            ),
            None if idx == typed_chars.len() => Span::styled(
                expected.to_string(),
                theme.text().add_modifier(Modifier::UNDERLINED),
            ),
            None => Span::styled(
                expected.to_string(),
                theme.muted().add_modifier(Modifier::DIM),
            ),
        };
        spans.push(span);
    }
    lines.push(Line::from(spans));
    lines
}

fn centered_pane(area: Rect, want_width: u16) -> Rect {
    let width = want_width.min(area.width);
    let x = area.x + (area.width - width) / 2;
    Rect {
        x,
        y: area.y,
        width,
        height: area.height,
    }
}
