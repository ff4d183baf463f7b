use anyhow::{Result, anyhow};
use clap::Args;
use serde_json::json;
use std::io::Write as _;
use std::str::FromStr as _;

use pursuit_core::config::ProjectConfig;
use pursuit_core::error::ErrorCode;
use pursuit_core::model::item::Stage;
use pursuit_core::store::{Notice, WorkItemStore};
use pursuit_core::transition::{Outcome, TransitionCoordinator, TransitionError};

use crate::output::{self, OutputMode};
use crate::source::{FileBackend, JsonSource};

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Work item id.
    pub id: String,

    /// Target stage (unassigned, assigned, reviewed, submitted, skipped, won, lost).
    pub to: String,
}

fn code_for(err: &TransitionError) -> ErrorCode {
    match err {
        TransitionError::ItemNotFound(_) => ErrorCode::ItemNotFound,
        TransitionError::Illegal(_) => ErrorCode::IllegalStageTransition,
    }
}

pub fn run_move(
    args: &MoveArgs,
    source: &JsonSource,
    config: &ProjectConfig,
    actor: &str,
    mode: OutputMode,
    now_us: i64,
) -> Result<()> {
    let to = Stage::from_str(&args.to).map_err(|e| anyhow!("{e}"))?;

    let mut store = WorkItemStore::new(source.fetch()?);
    let mut gateway = FileBackend::new(source.clone());
    let mut coordinator = TransitionCoordinator::new(config.lifecycle.policy);

    let outcome = coordinator
        .transition(&mut store, &mut gateway, &args.id, to, actor, now_us)
        .map_err(|err| {
            let code = code_for(&err);
            let hint = code
                .hint()
                .map(|h| format!("\nhint: {h}"))
                .unwrap_or_default();
            anyhow!("{code}: {err}{hint}")
        })?;

    let notices = store.drain_notices();
    match mode {
        OutputMode::Json => output::print_json(&json!({
            "outcome": outcome_json(&outcome),
            "notices": notices.iter().map(notice_json).collect::<Vec<_>>(),
        })),
        OutputMode::Pretty => {
            let mut stdout = std::io::stdout().lock();
            match &outcome {
                Outcome::Unchanged => {
                    writeln!(stdout, "{} is already {}", args.id, to)?;
                }
                Outcome::Committed { from, to, .. } => {
                    writeln!(stdout, "{}: {} -> {}", args.id, from, to)?;
                }
                Outcome::RolledBack { reason, .. } => {
                    writeln!(
                        stdout,
                        "{}: {} ({reason}); item restored",
                        ErrorCode::StageChangeRejected,
                        ErrorCode::StageChangeRejected.message()
                    )?;
                }
            }
            Ok(())
        }
    }
}

fn outcome_json(outcome: &Outcome) -> serde_json::Value {
    match outcome {
        Outcome::Unchanged => json!({ "kind": "unchanged" }),
        Outcome::Committed { item_id, from, to } => json!({
            "kind": "committed",
            "item_id": item_id,
            "from": from,
            "to": to,
        }),
        Outcome::RolledBack { item_id, reason } => json!({
            "kind": "rolled-back",
            "item_id": item_id,
            "reason": reason,
        }),
    }
}

fn notice_json(notice: &Notice) -> serde_json::Value {
    match notice {
        Notice::StageCommitted {
            item_id,
            from,
            to,
            actor,
        } => json!({
            "kind": "stage-committed",
            "item_id": item_id,
            "from": from,
            "to": to,
            "actor": actor,
        }),
        Notice::StageRolledBack {
            item_id,
            restored,
            attempted,
            reason,
        } => json!({
            "kind": "stage-rolled-back",
            "item_id": item_id,
            "restored": restored,
            "attempted": attempted,
            "reason": reason,
        }),
        Notice::CellCommitted {
            item_id,
            column_key,
        } => json!({
            "kind": "cell-committed",
            "item_id": item_id,
            "column_key": column_key,
        }),
        Notice::CollectionRefreshed { count } => json!({
            "kind": "collection-refreshed",
            "count": count,
        }),
    }
}
