//! Grid view rendering: the paged table, header chrome, and status line.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use pursuit_grid::state::SortDirection;

use super::app::{App, InputMode};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_table(frame, app, chunks[0]);
    draw_status(frame, app, chunks[1]);
    draw_prompt(frame, app, chunks[2]);
}

fn draw_table(frame: &mut Frame, app: &App, area: Rect) {
    let page = app.page();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" pursuits / grid ");

    if page.is_filtered_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from("No pursuits match the active filters."),
            Line::from("Press c to clear filters."),
        ])
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let columns = app.grid.columns.visible_data();

    let mut header_cells = vec![Cell::from(" ")];
    for (idx, column) in columns.iter().enumerate() {
        let mut label = column.label.clone();
        if let Some(spec) = app.grid.sort() {
            if spec.key == column.key {
                label.push(match spec.direction {
                    SortDirection::Ascending => '^',
                    SortDirection::Descending => 'v',
                });
            }
        }
        if app.grid.filters().contains_key(&column.key) {
            label.push('*');
        }
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if idx + 1 == app.cursor_col {
            style = style.fg(Color::Yellow);
        }
        header_cells.push(Cell::from(label).style(style));
    }

    let editing_cell = app.edit.cell();
    let rows: Vec<Row> = page
        .rows
        .iter()
        .enumerate()
        .map(|(row_idx, item)| {
            let marker = if app.grid.selection.is_selected(&item.id) {
                "x"
            } else {
                " "
            };
            let mut cells = vec![Cell::from(marker)];
            for column in &columns {
                let is_edited = app.input_mode == InputMode::Edit
                    && editing_cell
                        .as_ref()
                        .is_some_and(|c| c.row_id == item.id && c.column_key == column.key);
                if is_edited {
                    let draft = app.edit.draft().unwrap_or_default();
                    cells.push(
                        Cell::from(format!("{draft}_"))
                            .style(Style::default().fg(Color::Black).bg(Color::Yellow)),
                    );
                } else {
                    cells.push(Cell::from(item.value(&column.key).display()));
                }
            }
            let mut style = Style::default();
            if row_idx == app.cursor_row {
                style = style.bg(Color::Rgb(40, 40, 60));
            }
            Row::new(cells).style(style)
        })
        .collect();

    let mut widths = vec![Constraint::Length(2)];
    widths.extend(
        columns
            .iter()
            .map(|c| Constraint::Length((c.width_px / 8).max(6))),
    );

    let table = Table::new(rows, widths)
        .header(Row::new(header_cells))
        .block(block);
    frame.render_widget(table, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let page = app.page();
    let left = format!(
        "page {}/{} · {} row(s) · {} selected",
        page.page,
        page.page_count,
        page.total_rows,
        app.grid.selection.len()
    );
    let message = app.status.as_deref().unwrap_or("");
    let line = Line::from(vec![
        Span::styled(left, Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(message, Style::default().fg(Color::Green)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let text = match app.input_mode {
        InputMode::Filter => format!("filter: {}_", app.filter_buf),
        InputMode::Edit => "editing: Enter saves, Esc cancels".to_string(),
        InputMode::Normal => {
            "j/k rows · h/l cols · s sort · / filter · space select · v range · e edit · E export · Tab board · q quit"
                .to_string()
        }
    };
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
