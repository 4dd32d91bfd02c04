//! Timeline view.
//!
//! Scrollable list of journal entries: creation time, sentiment score,
//! transcription, and tagged-event labels.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, HighlightSpacing, List, ListItem, ListState, Padding, Paragraph},
};
use std::io::{self, Stdout};
use std::time::Duration;

use crate::api::Entry;

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const META_FG: Color = Color::Rgb(100, 100, 100);
const POSITIVE_FG: Color = Color::Green;
const NEGATIVE_FG: Color = Color::Red;
const NEUTRAL_FG: Color = Color::Yellow;
const HIGHLIGHT_BG: Color = Color::Rgb(20, 20, 20);

/// Interactive viewer for the entry timeline.
pub struct TimelineViewer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    entries: Vec<Entry>,
    list_state: ListState,
}

impl TimelineViewer {
    pub fn new(entries: Vec<Entry>) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let mut list_state = ListState::default();
        if !entries.is_empty() {
            list_state.select(Some(0));
        }

        Ok(Self {
            terminal,
            entries,
            list_state,
        })
    }

    /// Runs the viewer loop until the user exits.
    pub fn run(&mut self) -> Result<()> {
        tracing::debug!("Timeline viewer started with {} entries", self.entries.len());

        loop {
            self.draw()?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Up => self.list_state.select_previous(),
                        KeyCode::Down => self.list_state.select_next(),
                        _ => {}
                    }
                }
            }
        }

        self.cleanup()
    }

    fn draw(&mut self) -> Result<()> {
        self.terminal.draw(|frame| {
            let area = frame.area();
            let block = Block::default()
                .padding(Padding::uniform(1))
                .style(Style::default().fg(FG).bg(BG));
            frame.render_widget(&block, area);
            let inner = block.inner(area);

            let [list_area, footer_area] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);

            if self.entries.is_empty() {
                let empty = Paragraph::new(
                    "No entries yet. Start by recording your first voice entry!",
                )
                .alignment(Alignment::Center);
                frame.render_widget(empty, list_area);
            } else {
                let items: Vec<ListItem> =
                    self.entries.iter().map(entry_item).collect();
                let list = List::new(items)
                    .block(
                        Block::default()
                            .title(" Timeline ")
                            .borders(Borders::ALL)
                            .padding(Padding::bottom(1)),
                    )
                    .highlight_style(Style::default().bg(HIGHLIGHT_BG))
                    .highlight_symbol("> ")
                    .highlight_spacing(HighlightSpacing::Always);
                frame.render_stateful_widget(list, list_area, &mut self.list_state);
            }

            let help = Paragraph::new("↑↓ scroll, esc/q exit")
                .alignment(Alignment::Center)
                .style(Style::default().fg(META_FG));
            frame.render_widget(help, footer_area);
        })?;

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TimelineViewer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Builds the three-line list item for one entry.
fn entry_item(entry: &Entry) -> ListItem<'static> {
    let timestamp = entry
        .created_at_local()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "No date".to_string());
    let sentiment = entry.sentiment();

    let header = Line::from(vec![
        Span::styled(timestamp, Style::default().fg(META_FG)),
        Span::raw("  "),
        Span::styled(
            format!("sentiment {sentiment:+.2}"),
            Style::default().fg(sentiment_color(sentiment)),
        ),
    ]);

    let transcription = Line::styled(
        entry
            .transcription
            .clone()
            .unwrap_or_else(|| "No transcription available".to_string()),
        Style::default().fg(FG),
    );

    let tags: Vec<String> = entry.events().iter().map(|e| e.label()).collect();
    let mut lines = vec![header, transcription];
    if !tags.is_empty() {
        lines.push(Line::styled(
            format!("⌁ {}", tags.join("  ·  ")),
            Style::default().fg(META_FG),
        ));
    }

    ListItem::new(lines)
}

fn sentiment_color(score: f64) -> Color {
    if score > 0.5 {
        POSITIVE_FG
    } else if score < -0.5 {
        NEGATIVE_FG
    } else {
        NEUTRAL_FG
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_bands_map_to_colors() {
        assert_eq!(sentiment_color(0.9), POSITIVE_FG);
        assert_eq!(sentiment_color(-0.9), NEGATIVE_FG);
        assert_eq!(sentiment_color(0.0), NEUTRAL_FG);
        assert_eq!(sentiment_color(0.5), NEUTRAL_FG);
    }
}
