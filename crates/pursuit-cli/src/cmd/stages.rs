use anyhow::Result;
use clap::Args;
use serde_json::json;
use std::io::Write as _;

use pursuit_core::config::ProjectConfig;
use pursuit_core::lifecycle::TransitionPolicy;
use pursuit_core::model::item::Stage;

use crate::output::{self, OutputMode};

#[derive(Args, Debug)]
pub struct StagesArgs {}

/// Print the canonical stage order and the legal-transition matrix under the
/// active policy.
pub fn run_stages(_args: &StagesArgs, config: &ProjectConfig, mode: OutputMode) -> Result<()> {
    let policy = config.lifecycle.policy;

    match mode {
        OutputMode::Json => {
            let transitions: serde_json::Map<String, serde_json::Value> = Stage::ALL
                .iter()
                .map(|from| {
                    let targets: Vec<&str> = Stage::ALL
                        .iter()
                        .filter(|to| policy.is_legal(*from, **to))
                        .map(|to| to.as_str())
                        .collect();
                    (from.as_str().to_string(), json!(targets))
                })
                .collect();
            output::print_json(&json!({
                "policy": policy.to_string(),
                "stages": Stage::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
                "transitions": transitions,
            }))
        }
        OutputMode::Pretty => {
            let mut stdout = std::io::stdout().lock();
            output::pretty_section(&mut stdout, &format!("Stage lifecycle ({policy})"))?;
            for from in TransitionPolicy::all_stages() {
                let targets: Vec<&str> = Stage::ALL
                    .iter()
                    .filter(|to| policy.is_legal(*from, **to))
                    .map(|to| to.as_str())
                    .collect();
                let rendered = if targets.is_empty() {
                    "(sealed)".to_string()
                } else {
                    targets.join(", ")
                };
                writeln!(stdout, "{:<12} -> {rendered}", from.as_str())?;
            }
            Ok(())
        }
    }
}
