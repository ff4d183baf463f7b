//! Terminal user interface for pursuit.
//!
//! Two full-screen views over one shared store:
//!
//! - [`app::ViewMode::Grid`]: the interactive table (sort, filter, page,
//!   select, inline edit, export).
//! - [`app::ViewMode::Board`]: stage lanes with optimistic item moves.

pub mod app;
mod board;
mod grid;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use std::time::Duration;

use pursuit_core::config::ProjectConfig;
use pursuit_core::store::WorkItemStore;

use crate::source::{FileBackend, JsonSource};
use app::{App, ViewMode};

/// Run the full-screen TUI until the user quits.
pub fn run_tui(source: JsonSource, config: &ProjectConfig, actor: &str) -> Result<()> {
    let store = WorkItemStore::new(source.fetch()?);
    let backend = FileBackend::new(source);
    let mut app = App::new(store, backend, config, actor);

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut app);
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut ratatui::DefaultTerminal, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| match app.view {
            ViewMode::Grid => grid::draw(frame, app),
            ViewMode::Board => board::draw(frame, app),
        })?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key)?;
                }
            }
        }
    }
    Ok(())
}
