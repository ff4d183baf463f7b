//! Stage lifecycle rules.
//!
//! The reference workflow never blocked any stage-to-stage move, which left
//! "can a won pursuit be reopened?" implicit. Here the answer is an explicit,
//! named policy instead of an accident of the implementation:
//!
//! - [`TransitionPolicy::SealedTerminal`] (default): `won`, `lost`, and
//!   `skipped` are final; nothing moves out of them.
//! - [`TransitionPolicy::ReopenAllowed`]: any stage may move to any other,
//!   reproducing the permissive reference behavior.
//!
//! Both policies treat `from == to` as illegal at this layer; the transition
//! coordinator short-circuits no-ops before ever consulting the lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::item::Stage;

/// Which stage-to-stage moves the lifecycle permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionPolicy {
    /// Terminal stages (`won`, `lost`, `skipped`) reject all outgoing moves.
    #[default]
    SealedTerminal,
    /// Every stage may move to every other stage.
    ReopenAllowed,
}

impl TransitionPolicy {
    /// Validate a transition from `from` to `to`.
    ///
    /// # Errors
    ///
    /// [`IllegalTransition`] when the move is a no-op or leaves a sealed
    /// terminal stage.
    pub fn check(self, from: Stage, to: Stage) -> Result<(), IllegalTransition> {
        if from == to {
            return Err(IllegalTransition {
                from,
                to,
                reason: "item is already in that stage",
            });
        }
        if self == Self::SealedTerminal && from.is_terminal() {
            return Err(IllegalTransition {
                from,
                to,
                reason: "terminal stages are sealed under the active policy",
            });
        }
        Ok(())
    }

    /// Convenience predicate over [`Self::check`].
    #[must_use]
    pub fn is_legal(self, from: Stage, to: Stage) -> bool {
        self.check(from, to).is_ok()
    }

    /// All stages in canonical display order.
    #[must_use]
    pub fn all_stages() -> &'static [Stage] {
        &Stage::ALL
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SealedTerminal => f.write_str("sealed-terminal"),
            Self::ReopenAllowed => f.write_str("reopen-allowed"),
        }
    }
}

/// Error returned when a stage transition violates the active policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IllegalTransition {
    pub from: Stage,
    pub to: Stage,
    pub reason: &'static str,
}

impl fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot move {} -> {}: {}", self.from, self.to, self.reason)
    }
}

impl std::error::Error for IllegalTransition {}

#[cfg(test)]
mod tests {
    use super::{IllegalTransition, Stage, TransitionPolicy};

    #[test]
    fn sealed_terminal_blocks_reopen() {
        let policy = TransitionPolicy::SealedTerminal;
        for terminal in [Stage::Won, Stage::Lost, Stage::Skipped] {
            assert!(matches!(
                policy.check(terminal, Stage::Assigned),
                Err(IllegalTransition { .. })
            ));
        }
        assert!(policy.is_legal(Stage::Assigned, Stage::Won));
        assert!(policy.is_legal(Stage::Submitted, Stage::Lost));
        assert!(policy.is_legal(Stage::Reviewed, Stage::Unassigned));
    }

    #[test]
    fn reopen_allowed_permits_everything_but_noops() {
        let policy = TransitionPolicy::ReopenAllowed;
        for from in Stage::ALL {
            for to in Stage::ALL {
                if from == to {
                    assert!(!policy.is_legal(from, to));
                } else {
                    assert!(policy.is_legal(from, to), "{from} -> {to} should pass");
                }
            }
        }
    }

    #[test]
    fn noop_is_illegal_under_both_policies() {
        for policy in [
            TransitionPolicy::SealedTerminal,
            TransitionPolicy::ReopenAllowed,
        ] {
            let err = policy.check(Stage::Assigned, Stage::Assigned).unwrap_err();
            assert_eq!(err.from, err.to);
        }
    }

    #[test]
    fn display_order_is_stable() {
        let names: Vec<String> = TransitionPolicy::all_stages()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            names,
            [
                "unassigned",
                "assigned",
                "reviewed",
                "submitted",
                "skipped",
                "won",
                "lost"
            ]
        );
    }

    #[test]
    fn policy_serde_uses_kebab_case() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrap {
            policy: TransitionPolicy,
        }
        let parsed: Wrap = toml::from_str("policy = \"reopen-allowed\"").unwrap();
        assert_eq!(parsed.policy, TransitionPolicy::ReopenAllowed);
        let rendered = toml::to_string(&Wrap {
            policy: TransitionPolicy::SealedTerminal,
        })
        .unwrap();
        assert_eq!(rendered.trim(), "policy = \"sealed-terminal\"");
    }
}
