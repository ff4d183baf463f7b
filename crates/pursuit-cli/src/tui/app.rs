//! TUI application state: one shared store rendered by two views.
//!
//! The grid view drives the tabular engine (sort, filter, paginate, select,
//! inline edit, export); the board view groups the same collection by stage
//! and drives the optimistic transition coordinator when items move. Both
//! views re-derive their rows from the store every frame, so a stage change
//! applied in one is visible in the other within the same pass.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use pursuit_core::config::ProjectConfig;
use pursuit_core::model::item::{Stage, WorkItem};
use pursuit_core::store::{Notice, WorkItemStore};
use pursuit_core::transition::{Outcome, TransitionCoordinator};
use pursuit_grid::column::{ColumnModel, ColumnRegistry};
use pursuit_grid::edit::{CommitOutcome, EditController, EditError};
use pursuit_grid::engine::{self, GridPage};
use pursuit_grid::export;
use pursuit_grid::state::GridState;

use crate::source::FileBackend;

/// Which renderer owns the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Grid,
    Board,
}

/// Keyboard routing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a filter for the cursor column.
    Filter,
    /// An inline cell edit is active.
    Edit,
}

pub struct App {
    pub store: WorkItemStore,
    pub backend: FileBackend,
    pub coordinator: TransitionCoordinator,
    pub grid: GridState,
    pub edit: EditController,
    pub view: ViewMode,
    pub input_mode: InputMode,
    /// Row cursor within the rendered page.
    pub cursor_row: usize,
    /// Column cursor within the visible data columns.
    pub cursor_col: usize,
    pub filter_buf: String,
    /// Board cursor: index into [`Stage::ALL`] and row within that lane.
    pub board_stage: usize,
    pub board_row: usize,
    pub status: Option<String>,
    pub should_quit: bool,
    actor: String,
}

impl App {
    pub fn new(
        store: WorkItemStore,
        backend: FileBackend,
        config: &ProjectConfig,
        actor: &str,
    ) -> Self {
        Self {
            store,
            backend,
            coordinator: TransitionCoordinator::new(config.lifecycle.policy),
            grid: GridState::new(ColumnRegistry::standard(), &config.grid),
            edit: EditController::default(),
            view: ViewMode::Grid,
            input_mode: InputMode::default(),
            cursor_row: 0,
            cursor_col: 1, // skip the structural selector column
            filter_buf: String::new(),
            board_stage: 0,
            board_row: 0,
            status: None,
            should_quit: false,
            actor: actor.to_string(),
        }
    }

    /// The rendered page for this frame.
    pub fn page(&self) -> GridPage<'_> {
        engine::run(self.store.items(), &self.grid)
    }

    /// Items in one board lane, collection order.
    pub fn lane(&self, stage: Stage) -> Vec<&WorkItem> {
        self.store
            .items()
            .iter()
            .filter(|item| item.stage == stage)
            .collect()
    }

    fn cursor_column(&self) -> Option<ColumnModel> {
        self.grid
            .columns
            .visible_data()
            .get(self.cursor_col.saturating_sub(1))
            .map(|c| (*c).clone())
    }

    fn cursor_item(&self) -> Option<WorkItem> {
        self.page().rows.get(self.cursor_row).map(|i| (*i).clone())
    }

    fn clamp_cursors(&mut self) {
        let page_len = self.page().rows.len();
        if self.cursor_row >= page_len {
            self.cursor_row = page_len.saturating_sub(1);
        }
        let col_count = self.grid.columns.visible_data().len();
        if self.cursor_col > col_count {
            self.cursor_col = col_count;
        }
        if self.cursor_col == 0 && col_count > 0 {
            self.cursor_col = 1;
        }
    }

    /// Pull store notices into the one-line status area.
    fn absorb_notices(&mut self) {
        for notice in self.store.drain_notices() {
            self.status = Some(match notice {
                Notice::StageCommitted { item_id, to, .. } => {
                    format!("{item_id} moved to {to}")
                }
                Notice::StageRolledBack {
                    item_id, reason, ..
                } => format!("{item_id} restored: {reason}"),
                Notice::CellCommitted {
                    item_id,
                    column_key,
                } => format!("{item_id}.{column_key} saved"),
                Notice::CollectionRefreshed { count } => {
                    format!("reloaded {count} item(s)")
                }
            });
        }
    }

    // -----------------------------------------------------------------------
    // Key event handling
    // -----------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.input_mode {
            InputMode::Filter => self.handle_filter_key(key),
            InputMode::Edit => self.handle_edit_key(key),
            InputMode::Normal => match self.view {
                ViewMode::Grid => self.handle_grid_key(key),
                ViewMode::Board => self.handle_board_key(key),
            },
        }
        self.clamp_cursors();
        self.absorb_notices();
        Ok(())
    }

    fn handle_grid_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.view = ViewMode::Board,
            KeyCode::Char('j') | KeyCode::Down => {
                let len = self.page().rows.len();
                if len > 0 && self.cursor_row + 1 < len {
                    self.cursor_row += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.cursor_row = self.cursor_row.saturating_sub(1);
            }
            KeyCode::Char('h') | KeyCode::Left => {
                if self.cursor_col > 1 {
                    self.cursor_col -= 1;
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                let cols = self.grid.columns.visible_data().len();
                if self.cursor_col < cols {
                    self.cursor_col += 1;
                }
            }
            KeyCode::Char('n') => {
                let (current, count) = {
                    let page = self.page();
                    (page.page, page.page_count)
                };
                if current < count {
                    self.grid.set_page(current + 1);
                    self.cursor_row = 0;
                }
            }
            KeyCode::Char('p') => {
                let current = self.page().page;
                if current > 1 {
                    self.grid.set_page(current - 1);
                    self.cursor_row = 0;
                }
            }
            KeyCode::Char('s') => {
                if let Some(column) = self.cursor_column() {
                    self.grid.cycle_sort(&column.key);
                }
            }
            KeyCode::Char('/') => {
                if let Some(column) = self.cursor_column() {
                    self.filter_buf = self
                        .grid
                        .filters()
                        .get(&column.key)
                        .cloned()
                        .unwrap_or_default();
                    self.input_mode = InputMode::Filter;
                }
            }
            KeyCode::Char('c') => {
                self.grid.clear_filters();
                self.status = Some("filters cleared".into());
            }
            KeyCode::Char(' ') => {
                if let Some(item) = self.cursor_item() {
                    self.grid.selection.toggle(&item.id);
                }
            }
            KeyCode::Char('v') => {
                let order = self.page().row_ids();
                if let Some(item) = self.cursor_item() {
                    self.grid.selection.select_range_from_anchor(&item.id, &order);
                }
            }
            KeyCode::Char('a') => {
                let order = self.page().row_ids();
                self.grid.selection.select_all_visible(&order);
            }
            KeyCode::Char('x') => self.grid.selection.clear(),
            KeyCode::Char('>') => {
                if let Some(column) = self.cursor_column() {
                    let _ = self.grid.columns.resize(&column.key, column.width_px + 20);
                }
            }
            KeyCode::Char('<') => {
                if let Some(column) = self.cursor_column() {
                    let _ = self
                        .grid
                        .columns
                        .resize(&column.key, column.width_px.saturating_sub(20));
                }
            }
            KeyCode::Char('z') => {
                if let Some(column) = self.cursor_column() {
                    match self.grid.columns.toggle_visible(&column.key) {
                        Ok(_) => self.status = Some(format!("{} hidden", column.label)),
                        Err(err) => self.status = Some(err.to_string()),
                    }
                }
            }
            KeyCode::Char('e') => self.begin_edit(),
            KeyCode::Char('E') => self.export_selection(),
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.filter_buf.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                if let Some(column) = self.cursor_column() {
                    self.grid.set_filter(&column.key, &self.filter_buf);
                }
                self.filter_buf.clear();
                self.input_mode = InputMode::Normal;
                self.cursor_row = 0;
            }
            KeyCode::Backspace => {
                self.filter_buf.pop();
            }
            KeyCode::Char(c) => self.filter_buf.push(c),
            _ => {}
        }
    }

    fn begin_edit(&mut self) {
        let Some(column) = self.cursor_column() else {
            return;
        };
        let Some(item) = self.cursor_item() else {
            return;
        };
        match self.edit.begin(&item, &column) {
            Ok(cell) => {
                self.grid.edit_cursor = Some(cell);
                self.input_mode = InputMode::Edit;
            }
            Err(EditError::NonEditable(_)) => {
                // Silent refusal: no network call, no error beyond a hint.
                self.status = Some(format!("{} is not editable", column.label));
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.edit.cancel();
                self.grid.edit_cursor = None;
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => self.commit_edit(),
            KeyCode::Backspace => self.edit.backspace(),
            KeyCode::Char(c) => self.edit.push_char(c),
            _ => {}
        }
    }

    fn commit_edit(&mut self) {
        match self.edit.commit(&mut self.backend) {
            Ok(CommitOutcome::Persisted {
                item_id,
                column_key,
                value,
            }) => {
                // The backend confirmed; fold the value into the shared
                // store (the grid never assumed success meanwhile).
                if let Err(err) =
                    self.store
                        .apply_confirmed_cell(&item_id, &column_key, value, crate::clock::now_us())
                {
                    self.status = Some(err.to_string());
                }
                self.grid.edit_cursor = None;
                self.input_mode = InputMode::Normal;
            }
            Ok(CommitOutcome::Failed { item_id, reason }) => {
                self.status = Some(format!("{item_id}: edit not saved ({reason})"));
                self.grid.edit_cursor = None;
                self.input_mode = InputMode::Normal;
            }
            Err(EditError::InvalidValue { draft, kind }) => {
                // Stay in the editor so the draft can be fixed.
                self.status = Some(format!("'{draft}' is not a valid {kind} value"));
            }
            Err(err) => {
                self.status = Some(err.to_string());
                self.input_mode = InputMode::Normal;
            }
        }
    }

    fn export_selection(&mut self) {
        let page = engine::run(self.store.items(), &self.grid);
        let selected: Vec<&WorkItem> = if self.grid.selection.is_empty() {
            page.rows.clone()
        } else {
            page.rows
                .iter()
                .filter(|item| self.grid.selection.is_selected(&item.id))
                .copied()
                .collect()
        };
        let columns = self.grid.columns.visible_data();
        let filename = export::suggested_filename(chrono::Local::now().date_naive());
        let outcome = export::export_rows(&selected, &columns, ',')
            .map_err(anyhow::Error::from)
            .and_then(|text| std::fs::write(&filename, text).map_err(anyhow::Error::from));
        self.status = Some(match outcome {
            Ok(()) => format!("exported {} row(s) to {filename}", selected.len()),
            Err(err) => format!("export failed: {err}"),
        });
    }

    // -----------------------------------------------------------------------
    // Board view
    // -----------------------------------------------------------------------

    fn handle_board_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.view = ViewMode::Grid,
            KeyCode::Char('h') | KeyCode::Left => {
                self.board_stage = self.board_stage.saturating_sub(1);
                self.board_row = 0;
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.board_stage + 1 < Stage::ALL.len() {
                    self.board_stage += 1;
                    self.board_row = 0;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                let len = self.lane(Stage::ALL[self.board_stage]).len();
                if len > 0 && self.board_row + 1 < len {
                    self.board_row += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.board_row = self.board_row.saturating_sub(1);
            }
            KeyCode::Char('H') => self.move_selected_by(-1),
            KeyCode::Char('L') => self.move_selected_by(1),
            _ => {}
        }
        let len = self.lane(Stage::ALL[self.board_stage]).len();
        if self.board_row >= len {
            self.board_row = len.saturating_sub(1);
        }
    }

    /// Drop gesture: move the item under the board cursor one lane over.
    /// The stage change lands in the store before the backend answers; on
    /// rejection the coordinator restores the snapshot and the item snaps
    /// back into its old lane.
    fn move_selected_by(&mut self, delta: i32) {
        let from_stage = Stage::ALL[self.board_stage];
        let Some(item) = self.lane(from_stage).get(self.board_row).map(|i| (*i).clone())
        else {
            return;
        };
        let target_idx = i32::try_from(self.board_stage).unwrap_or(0) + delta;
        let Ok(target_idx) = usize::try_from(target_idx) else {
            return;
        };
        let Some(to_stage) = Stage::ALL.get(target_idx).copied() else {
            return;
        };

        let actor = self.actor.clone();
        match self.coordinator.transition(
            &mut self.store,
            &mut self.backend,
            &item.id,
            to_stage,
            &actor,
            crate::clock::now_us(),
        ) {
            Ok(Outcome::Committed { .. }) => {
                // Follow the item into its new lane.
                self.board_stage = target_idx;
                self.board_row = self
                    .lane(to_stage)
                    .iter()
                    .position(|i| i.id == item.id)
                    .unwrap_or(0);
            }
            Ok(Outcome::RolledBack { .. } | Outcome::Unchanged) => {}
            Err(err) => self.status = Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{App, InputMode, ViewMode};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pursuit_core::config::ProjectConfig;
    use pursuit_core::model::item::{Stage, WorkItem};
    use pursuit_core::store::WorkItemStore;
    use crate::source::{FileBackend, JsonSource};

    fn seed_items() -> Vec<WorkItem> {
        (1..=4)
            .map(|i| WorkItem {
                id: format!("rfp-{i}"),
                title: format!("Pursuit {i}"),
                stage: if i % 2 == 0 {
                    Stage::Assigned
                } else {
                    Stage::Unassigned
                },
                ..WorkItem::default()
            })
            .collect()
    }

    fn make_app(dir: &std::path::Path) -> App {
        let items = seed_items();
        let path = dir.join("items.json");
        std::fs::write(&path, serde_json::to_string(&items).unwrap()).unwrap();
        let source = JsonSource::new(path);
        App::new(
            WorkItemStore::new(items),
            FileBackend::new(source),
            &ProjectConfig::default(),
            "tui-test",
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    #[test]
    fn q_quits() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = make_app(dir.path());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn tab_toggles_views() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = make_app(dir.path());
        assert_eq!(app.view, ViewMode::Grid);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.view, ViewMode::Board);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.view, ViewMode::Grid);
    }

    #[test]
    fn cursor_stays_inside_the_page() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = make_app(dir.path());
        for _ in 0..10 {
            press(&mut app, KeyCode::Char('j'));
        }
        assert_eq!(app.cursor_row, 3);
        for _ in 0..10 {
            press(&mut app, KeyCode::Char('k'));
        }
        assert_eq!(app.cursor_row, 0);
    }

    #[test]
    fn filter_mode_applies_on_enter() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = make_app(dir.path());
        // Cursor starts on the first data column (id); move to title.
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode, InputMode::Filter);
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.page().rows.len(), 1);
        assert_eq!(app.page().rows[0].id, "rfp-2");
    }

    #[test]
    fn filter_mode_escape_discards() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = make_app(dir.path());
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('z'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.grid.filters().is_empty());
        assert_eq!(app.page().rows.len(), 4);
    }

    #[test]
    fn selection_keys_drive_the_manager() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = make_app(dir.path());
        press(&mut app, KeyCode::Char(' '));
        assert!(app.grid.selection.is_selected("rfp-1"));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('v'));
        assert_eq!(app.grid.selection.len(), 3);
        press(&mut app, KeyCode::Char('x'));
        assert!(app.grid.selection.is_empty());
    }

    #[test]
    fn edit_on_badge_column_is_refused_silently() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = make_app(dir.path());
        // Move the column cursor to "stage" (id, title, client, stage).
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(!app.edit.is_editing());
        assert!(app.status.as_deref().is_some_and(|s| s.contains("not editable")));
    }

    #[test]
    fn edit_commit_updates_store_through_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = make_app(dir.path());
        press(&mut app, KeyCode::Char('l')); // title column
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.input_mode, InputMode::Edit);
        // Clear the seeded title and type a new one.
        for _ in 0..20 {
            press(&mut app, KeyCode::Backspace);
        }
        for c in "Rewritten".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.store.get("rfp-1").unwrap().title, "Rewritten");
    }

    #[test]
    fn edit_escape_leaves_value_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = make_app(dir.path());
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('e'));
        for c in "garbage".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.store.get("rfp-1").unwrap().title, "Pursuit 1");
        assert!(app.grid.edit_cursor.is_none());
    }

    #[test]
    fn board_move_applies_optimistically_and_confirms() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = make_app(dir.path());
        press(&mut app, KeyCode::Tab); // board view, unassigned lane
        assert_eq!(app.lane(Stage::Unassigned).len(), 2);
        press(&mut app, KeyCode::Char('L'));
        // rfp-1 moved unassigned -> assigned and the cursor followed it.
        assert_eq!(app.lane(Stage::Unassigned).len(), 1);
        assert_eq!(app.lane(Stage::Assigned).len(), 3);
        assert_eq!(app.board_stage, 1);
        assert_eq!(app.store.get("rfp-1").unwrap().stage, Stage::Assigned);
        assert!(app.status.as_deref().is_some_and(|s| s.contains("moved")));
    }

    #[test]
    fn board_move_off_the_edge_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = make_app(dir.path());
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('H'));
        assert_eq!(app.store.get("rfp-1").unwrap().stage, Stage::Unassigned);
    }
}
