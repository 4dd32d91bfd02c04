//! Full-screen error display.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::Paragraph};
use std::io::{self, Stdout};

/// Shows a human-readable error over a full-screen red background and
/// waits for a keypress before restoring the terminal.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// # Errors
    /// - If the terminal cannot be initialized or raw mode enabled
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    /// Renders the message centered and blocks until a key is pressed.
    pub fn show_error(&mut self, message: &str) -> anyhow::Result<()> {
        self.terminal.draw(|frame| {
            let area = frame.area();
            let text = format!("{message}\n\nPress any key to continue");
            let line_count = text.lines().count() as u16;
            let top_pad = area.height.saturating_sub(line_count) / 2;

            let paragraph = Paragraph::new(format!("{}{}", "\n".repeat(top_pad as usize), text))
                .alignment(Alignment::Center)
                .style(Style::default().bg(Color::Red).fg(Color::White));
            frame.render_widget(paragraph, area);
        })?;

        loop {
            if let Event::Key(_) = event::read()? {
                break;
            }
        }
        Ok(())
    }

    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Convenience wrapper: show an error screen for `message`, then clean up.
pub fn show(message: &str) -> anyhow::Result<()> {
    let mut screen = ErrorScreen::new()?;
    screen.show_error(message)?;
    screen.cleanup()
}
