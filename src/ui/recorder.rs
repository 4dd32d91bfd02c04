//! Recording session view.
//!
//! Renders a sparkline of recent input levels with an elapsed-time
//! footer while recording, then a status frame while the upload runs and
//! when its result (or an error) comes back.

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Sparkline},
};
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

/// User input during a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderCommand {
    /// No relevant key pressed; keep recording.
    Continue,
    /// Stop recording and upload the entry (Enter).
    StopAndUpload,
    /// Discard the session (Escape, 'q', Ctrl+C).
    Cancel,
}

/// Terminal UI for the recording session.
pub struct RecorderTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    level_history: Vec<u64>,
    terminal_width: usize,
    last_sample_time: Instant,
    sample_interval: Duration,
}

impl RecorderTui {
    /// Enters alternate screen mode and prepares the level history.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized or raw mode enabled
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        let terminal_width = terminal.size()?.width as usize;

        Ok(Self {
            terminal,
            level_history: vec![0; terminal_width],
            terminal_width,
            last_sample_time: Instant::now(),
            sample_interval: Duration::from_millis(50),
        })
    }

    /// Polls for input for up to 50ms and maps it to a command.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> anyhow::Result<RecorderCommand> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Enter => {
                        tracing::debug!("Enter pressed: stopping and uploading");
                        RecorderCommand::StopAndUpload
                    }
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Escape/'q' pressed: canceling session");
                        RecorderCommand::Cancel
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        RecorderCommand::Cancel
                    }
                    _ => RecorderCommand::Continue,
                });
            }
        }
        Ok(RecorderCommand::Continue)
    }

    /// Renders one recording frame: level sparkline plus footer.
    ///
    /// `level` is the meter's normalized `[0,1]` loudness for this frame.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_recording(&mut self, level: f32, elapsed_secs: u64) -> anyhow::Result<()> {
        let percent = (level.clamp(0.0, 1.0) * 100.0).round() as u64;

        if self.last_sample_time.elapsed() >= self.sample_interval {
            self.level_history.push(percent);
            if self.level_history.len() > self.terminal_width {
                self.level_history.remove(0);
            }
            self.last_sample_time = Instant::now();
        }

        let current_width = self.terminal.size()?.width as usize;
        if current_width != self.terminal_width {
            self.terminal_width = current_width;
            while self.level_history.len() > self.terminal_width {
                self.level_history.remove(0);
            }
            while self.level_history.len() < self.terminal_width {
                self.level_history.insert(0, 0);
            }
        }

        let elapsed = format_elapsed(elapsed_secs);

        self.terminal.draw(|frame| {
            let area = frame.area();
            let [meter_area, footer_area] =
                Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

            let sparkline = Sparkline::default()
                .data(&self.level_history)
                .max(100)
                .style(
                    Style::default()
                        .bg(Color::Rgb(0, 0, 0))
                        .fg(Color::Rgb(206, 224, 220)),
                );
            frame.render_widget(sparkline, meter_area);

            let footer = Paragraph::new(Line::from(vec![
                Span::styled("● ", Style::default().fg(Color::Red)),
                Span::raw(elapsed),
                Span::raw(" / "),
                Span::raw(format!("{percent}%")),
                Span::raw("   ↵ save entry · esc cancel"),
            ]))
            .style(
                Style::default()
                    .fg(Color::Rgb(185, 207, 212))
                    .bg(Color::Rgb(0, 0, 0)),
            );
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Renders a full-frame status message (upload progress or result).
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_status(&mut self, message: &str, is_error: bool) -> anyhow::Result<()> {
        let style = if is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Rgb(206, 224, 220))
        };

        self.terminal.draw(|frame| {
            let area = frame.area();
            let top_pad = area.height.saturating_sub(2) / 2;
            let paragraph =
                Paragraph::new(format!("{}{}", "\n".repeat(top_pad as usize), message))
                    .alignment(Alignment::Center)
                    .style(style.bg(Color::Rgb(0, 0, 0)))
                    .wrap(ratatui::widgets::Wrap { trim: true });
            frame.render_widget(paragraph, area);
        })?;

        Ok(())
    }

    /// Blocks until any key is pressed.
    pub fn wait_for_key(&mut self) -> anyhow::Result<()> {
        loop {
            if let Event::Key(_) = event::read()? {
                return Ok(());
            }
        }
    }

    /// Restores the terminal to normal mode.
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Formats elapsed seconds as `m:ss`.
pub(crate) fn format_elapsed(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_formats_as_minutes_and_seconds() {
        assert_eq!(format_elapsed(0), "0:00");
        assert_eq!(format_elapsed(9), "0:09");
        assert_eq!(format_elapsed(61), "1:01");
        assert_eq!(format_elapsed(600), "10:00");
    }
}
