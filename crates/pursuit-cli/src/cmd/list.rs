use anyhow::{Context as _, Result};
use clap::Args;
use serde_json::json;
use std::io::Write as _;

use pursuit_core::config::ProjectConfig;
use pursuit_grid::column::ColumnRegistry;
use pursuit_grid::engine;
use pursuit_grid::state::GridState;

use crate::output::{self, OutputMode};
use crate::source::JsonSource;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter by stage (substring of the stage name).
    #[arg(long)]
    pub stage: Option<String>,

    /// Filter by owner (substring).
    #[arg(long)]
    pub owner: Option<String>,

    /// Column filter, `KEY=SUBSTRING`. Repeatable; filters AND together.
    #[arg(long = "filter", value_name = "KEY=SUBSTRING")]
    pub filters: Vec<String>,

    /// Sort by this column key.
    #[arg(long, value_name = "KEY")]
    pub sort: Option<String>,

    /// Reverse the sort (requires --sort).
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// 1-based page to show.
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page (25, 50, 100, or 250).
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Show every data column, including notes and link.
    #[arg(long)]
    pub wide: bool,
}

/// Build grid state from CLI flags: the flag surface maps 1:1 onto the
/// interactive grid's filter/sort/page state.
fn state_from_args(args: &ListArgs, config: &ProjectConfig) -> Result<GridState> {
    let mut columns = ColumnRegistry::standard();
    if !args.wide {
        columns.toggle_visible("notes").ok();
        columns.toggle_visible("url").ok();
        columns.toggle_visible("estimated_hours").ok();
        columns.toggle_visible("actual_hours").ok();
    }

    let mut state = GridState::new(columns, &config.grid);
    if let Some(stage) = &args.stage {
        state.set_filter("stage", stage);
    }
    if let Some(owner) = &args.owner {
        state.set_filter("owner", owner);
    }
    for pair in &args.filters {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("bad --filter '{pair}': expected KEY=SUBSTRING"))?;
        state.set_filter(key, value);
    }
    if let Some(sort) = &args.sort {
        state.cycle_sort(sort);
        if args.desc {
            state.cycle_sort(sort);
        }
    }
    if let Some(size) = args.page_size {
        state.set_page_size(size);
    }
    state.set_page(args.page);
    Ok(state)
}

pub fn run_list(args: &ListArgs, source: &JsonSource, config: &ProjectConfig, mode: OutputMode) -> Result<()> {
    let items = source.fetch()?;
    let state = state_from_args(args, config)?;
    let page = engine::run(&items, &state);

    match mode {
        OutputMode::Json => {
            let rows: Vec<serde_json::Value> = page
                .rows
                .iter()
                .map(|item| serde_json::to_value(item).unwrap_or(serde_json::Value::Null))
                .collect();
            output::print_json(&json!({
                "rows": rows,
                "page": page.page,
                "page_count": page.page_count,
                "page_size": page.page_size,
                "total_rows": page.total_rows,
            }))
        }
        OutputMode::Pretty => {
            let mut stdout = std::io::stdout().lock();
            if page.is_filtered_empty() {
                writeln!(stdout, "No pursuits match the active filters.")?;
                writeln!(stdout, "Drop --filter/--stage/--owner flags to widen the view.")?;
                return Ok(());
            }

            let columns = state.columns.visible_data();
            let widths: Vec<usize> = columns
                .iter()
                .map(|c| (usize::from(c.width_px) / 8).max(6))
                .collect();

            let header: Vec<String> = columns
                .iter()
                .zip(&widths)
                .map(|(c, w)| output::fit_cell(&c.label, *w))
                .collect();
            writeln!(stdout, "{}", header.join("  "))?;
            output::pretty_rule(&mut stdout)?;

            for item in &page.rows {
                let cells: Vec<String> = columns
                    .iter()
                    .zip(&widths)
                    .map(|(c, w)| output::fit_cell(&item.value(&c.key).display(), *w))
                    .collect();
                writeln!(stdout, "{}", cells.join("  "))?;
            }

            output::pretty_rule(&mut stdout)?;
            writeln!(
                stdout,
                "page {}/{} · {} row(s)",
                page.page, page.page_count, page.total_rows
            )?;
            Ok(())
        }
    }
}
