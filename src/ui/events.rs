//! Event-frequency view.
//!
//! Shows recurring "main" events and the count of every tagged event
//! across the journal.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph},
};
use std::io::{self, Stdout};
use std::time::Duration;

use crate::api::EventSummary;

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const META_FG: Color = Color::Rgb(100, 100, 100);
const COUNT_FG: Color = Color::Green;

/// Interactive viewer for the aggregate event summary.
pub struct EventsViewer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    summary: EventSummary,
    list_state: ListState,
}

impl EventsViewer {
    pub fn new(summary: EventSummary) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let mut list_state = ListState::default();
        if !summary.all_events.is_empty() {
            list_state.select(Some(0));
        }

        Ok(Self {
            terminal,
            summary,
            list_state,
        })
    }

    /// Runs the viewer loop until the user exits.
    pub fn run(&mut self) -> Result<()> {
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
        let main_events = if self.summary.main_events.is_empty() {
            "No recurring events yet".to_string()
        } else {
            self.summary.main_events.join("  ·  ")
        };

        self.terminal.draw(|frame| {
            let area = frame.area();
            let block = Block::default()
                .padding(Padding::uniform(1))
                .style(Style::default().fg(FG).bg(BG));
            frame.render_widget(&block, area);
            let inner = block.inner(area);

            let [main_area, freq_area, footer_area] = Layout::vertical([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .areas(inner);

            let main_block = Paragraph::new(main_events.clone())
                .block(Block::default().title(" Main Events ").borders(Borders::ALL));
            frame.render_widget(main_block, main_area);

            if self.summary.all_events.is_empty() {
                let empty = Paragraph::new("No events tagged yet")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(META_FG));
                frame.render_widget(empty, freq_area);
            } else {
                let items: Vec<ListItem> = self
                    .summary
                    .all_events
                    .iter()
                    .map(|(name, count)| {
                        ListItem::new(Line::from(vec![
                            Span::styled(name.clone(), Style::default().fg(FG)),
                            Span::raw("  "),
                            Span::styled(format!("×{count}"), Style::default().fg(COUNT_FG)),
                        ]))
                    })
                    .collect();
                let list = List::new(items)
                    .block(
                        Block::default()
                            .title(" Event Frequency ")
                            .borders(Borders::ALL),
                    )
                    .highlight_symbol("> ");
                frame.render_stateful_widget(list, freq_area, &mut self.list_state);
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

impl Drop for EventsViewer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
