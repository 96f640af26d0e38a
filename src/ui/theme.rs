use ratatui::style::{Color, Modifier, Style};

/// Explicit color context threaded through every render call; created at
/// startup from config, toggled by the user, never a global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub dark: bool,
}

impl Theme {
    pub fn new(dark: bool) -> Self {
        Self { dark }
    }

    pub fn toggled(self) -> Self {
        Self { dark: !self.dark }
    }

    pub fn text(&self) -> Style {
        if self.dark {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::Black)
        }
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn success(&self) -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    }

    pub fn label(&self) -> &'static str {
        if self.dark {
            "dark"
        } else {
            "light"
        }
    }
}
