use anyhow::{Context as _, Result};
use clap::Args;
use std::io::Write as _;
use std::path::PathBuf;

use pursuit_core::config::ProjectConfig;
use pursuit_core::error::ErrorCode;
use pursuit_grid::column::ColumnRegistry;
use pursuit_grid::engine;
use pursuit_grid::export::{export_rows, suggested_filename};
use pursuit_grid::state::GridState;

use crate::source::JsonSource;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output path. Omit to write to stdout; use --save for the suggested
    /// dated filename in the current directory.
    #[arg(long, value_name = "PATH", conflicts_with = "save")]
    pub output: Option<PathBuf>,

    /// Write to the suggested `pursuit-export-<date>.csv` filename.
    #[arg(long)]
    pub save: bool,

    /// Field delimiter (defaults to the configured one).
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Filter by stage before exporting.
    #[arg(long)]
    pub stage: Option<String>,

    /// Column filter, `KEY=SUBSTRING`. Repeatable.
    #[arg(long = "filter", value_name = "KEY=SUBSTRING")]
    pub filters: Vec<String>,

    /// Sort by this column key before exporting.
    #[arg(long, value_name = "KEY")]
    pub sort: Option<String>,
}

pub fn run_export(args: &ExportArgs, source: &JsonSource, config: &ProjectConfig) -> Result<()> {
    let items = source.fetch()?;

    let mut state = GridState::new(ColumnRegistry::standard(), &config.grid);
    state.set_page_size(250);
    if let Some(stage) = &args.stage {
        state.set_filter("stage", stage);
    }
    for pair in &args.filters {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("bad --filter '{pair}': expected KEY=SUBSTRING"))?;
        state.set_filter(key, value);
    }
    if let Some(sort) = &args.sort {
        state.cycle_sort(sort);
    }

    // Export covers the whole filtered set, not one page.
    let mut rows = Vec::new();
    let page_count = engine::run(&items, &state).page_count;
    for page in 1..=page_count {
        state.set_page(page);
        rows.extend(engine::run(&items, &state).rows);
    }

    let delimiter = args.delimiter.unwrap_or(config.grid.delimiter);
    let columns = state.columns.visible_data();
    let text = export_rows(&rows, &columns, delimiter)
        .with_context(|| format!("{}: {}", ErrorCode::ExportWriteFailed, ErrorCode::ExportWriteFailed.message()))?;

    let target = if args.save {
        Some(PathBuf::from(suggested_filename(
            chrono::Local::now().date_naive(),
        )))
    } else {
        args.output.clone()
    };

    match target {
        Some(path) => {
            std::fs::write(&path, &text).with_context(|| {
                format!(
                    "{}: failed to write {}",
                    ErrorCode::ExportWriteFailed,
                    path.display()
                )
            })?;
            eprintln!("exported {} row(s) to {}", rows.len(), path.display());
        }
        None => {
            std::io::stdout().lock().write_all(text.as_bytes())?;
        }
    }
    Ok(())
}
