//! Board view rendering: one lane per stage over the same shared store.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use pursuit_core::model::item::Stage;

use super::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    draw_lanes(frame, app, chunks[0]);
    draw_status(frame, app, chunks[1]);
}

fn draw_lanes(frame: &mut Frame, app: &App, area: Rect) {
    let lane_count = u32::try_from(Stage::ALL.len()).unwrap_or(1);
    let constraints: Vec<Constraint> = Stage::ALL
        .iter()
        .map(|_| Constraint::Ratio(1, lane_count))
        .collect();
    let lanes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (lane_idx, stage) in Stage::ALL.iter().enumerate() {
        let items = app.lane(*stage);
        let focused = lane_idx == app.board_stage;

        let list_items: Vec<ListItem> = items
            .iter()
            .enumerate()
            .map(|(row_idx, item)| {
                let mut style = Style::default();
                if focused && row_idx == app.board_row {
                    style = style
                        .add_modifier(Modifier::BOLD)
                        .bg(Color::Rgb(40, 40, 60));
                }
                ListItem::new(Line::from(format!("{} {}", item.id, item.title))).style(style)
            })
            .collect();

        let border_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ({}) ", stage, items.len()));
        frame.render_widget(List::new(list_items).block(block), lanes[lane_idx]);
    }
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let message = app.status.as_deref().unwrap_or(
        "h/l lanes · j/k items · L/H move item right/left · Tab grid · q quit",
    );
    frame.render_widget(
        Paragraph::new(message).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
