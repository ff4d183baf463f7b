//! Optimistic stage-transition protocol.
//!
//! A stage change is applied to the shared store immediately (so no view
//! ever lags behind a drop gesture), then confirmed with the external
//! backend, then either committed or rolled back to an exact pre-transition
//! snapshot.
//!
//! The protocol is split in two phases so hosts with deferred confirmation
//! can hold several in-flight transitions at once:
//!
//! 1. [`TransitionCoordinator::begin`]: validate, snapshot, apply locally.
//! 2. [`TransitionCoordinator::resolve`]: commit on success, restore the
//!    snapshot on failure.
//!
//! Each call owns its snapshot. Rapid repeated transitions on one item each
//! get an independent snapshot/rollback pair; the later-resolving call's
//! outcome is authoritative for the final stage. An earlier failure still
//! restores *its own* snapshot, which can show as a transient flicker; an
//! accepted trade-off, covered by tests rather than papered over.
//!
//! Failures are never retried automatically. Synchronous hosts use
//! [`TransitionCoordinator::transition`], which drives a [`StageGateway`]
//! through both phases in one call.

use std::fmt;

use crate::lifecycle::{IllegalTransition, TransitionPolicy};
use crate::model::item::{Stage, WorkItem};
use crate::store::{Notice, StoreError, WorkItemStore};

/// External stage-update collaborator (network/storage, owned elsewhere).
pub trait StageGateway {
    /// Ask the backend to persist `item_id` moving to `to`.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] triggers an exact local rollback; the error is
    /// surfaced through the store's notice queue and the returned outcome.
    fn request_stage_change(
        &mut self,
        item_id: &str,
        to: Stage,
        actor: &str,
    ) -> Result<(), GatewayError>;
}

/// Why the backend did not confirm a change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("rejected by server: {0}")]
    Rejected(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
}

/// A locally-applied transition awaiting backend confirmation.
///
/// Owns the full pre-transition snapshot; dropping it without calling
/// [`TransitionCoordinator::resolve`] leaves the optimistic state in place.
#[derive(Debug, Clone)]
pub struct PendingTransition {
    seq: u64,
    item_id: String,
    from: Stage,
    to: Stage,
    actor: String,
    snapshot: WorkItem,
}

impl PendingTransition {
    #[must_use]
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    #[must_use]
    pub const fn from(&self) -> Stage {
        self.from
    }

    #[must_use]
    pub const fn to(&self) -> Stage {
        self.to
    }

    /// Per-coordinator issue order, for hosts that log or trace transitions.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

/// Result of [`TransitionCoordinator::begin`].
#[derive(Debug)]
pub enum Begun {
    /// The item is already in the target stage; nothing was touched.
    Unchanged,
    /// The stage was applied locally; confirmation is outstanding.
    Pending(PendingTransition),
}

/// Final outcome of a transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Committed {
        item_id: String,
        from: Stage,
        to: Stage,
    },
    RolledBack {
        item_id: String,
        reason: String,
    },
}

/// Structurally invalid request: refused locally, no gateway call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("item '{0}' not found")]
    ItemNotFound(String),
    #[error(transparent)]
    Illegal(#[from] IllegalTransition),
}

impl From<StoreError> for TransitionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ItemNotFound(id) => Self::ItemNotFound(id),
            StoreError::UnknownField { id, .. } => Self::ItemNotFound(id),
        }
    }
}

/// Orchestrates snapshot / local apply / confirm / rollback.
#[derive(Debug)]
pub struct TransitionCoordinator {
    policy: TransitionPolicy,
    next_seq: u64,
}

impl TransitionCoordinator {
    #[must_use]
    pub const fn new(policy: TransitionPolicy) -> Self {
        Self {
            policy,
            next_seq: 0,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Phase one: validate the request, snapshot the item, apply the stage
    /// locally so every subscribed view reflects it within this pass.
    ///
    /// A request targeting the item's current stage is a no-op and returns
    /// [`Begun::Unchanged`] without consulting the lifecycle policy.
    ///
    /// # Errors
    ///
    /// [`TransitionError`] when the item is unknown or the move violates the
    /// active policy. Nothing is applied and no confirmation should be sent.
    pub fn begin(
        &mut self,
        store: &mut WorkItemStore,
        item_id: &str,
        to: Stage,
        actor: &str,
    ) -> Result<Begun, TransitionError> {
        let item = store
            .get(item_id)
            .ok_or_else(|| TransitionError::ItemNotFound(item_id.to_string()))?;
        let from = item.stage;
        if from == to {
            return Ok(Begun::Unchanged);
        }
        self.policy.check(from, to)?;

        let snapshot = item.clone();
        store.set_stage(item_id, to)?;
        let seq = self.next_seq;
        self.next_seq += 1;
        tracing::debug!(item_id, %from, %to, seq, "stage applied optimistically");

        Ok(Begun::Pending(PendingTransition {
            seq,
            item_id: item_id.to_string(),
            from,
            to,
            actor: actor.to_string(),
            snapshot,
        }))
    }

    /// Phase two: fold the backend's answer into the store.
    ///
    /// On success the optimistic state stands and `updated_at` becomes
    /// durable. On failure the item is restored bit-for-bit from this call's
    /// own snapshot; later transitions on the same item keep their own
    /// snapshots and are not clobbered beyond the documented flicker.
    pub fn resolve(
        store: &mut WorkItemStore,
        pending: PendingTransition,
        confirmation: Result<(), GatewayError>,
        now_us: i64,
    ) -> Outcome {
        match confirmation {
            Ok(()) => {
                store.touch_updated(&pending.item_id, now_us);
                store.push_notice(Notice::StageCommitted {
                    item_id: pending.item_id.clone(),
                    from: pending.from,
                    to: pending.to,
                    actor: pending.actor.clone(),
                });
                tracing::info!(
                    item_id = pending.item_id,
                    from = %pending.from,
                    to = %pending.to,
                    actor = pending.actor,
                    "stage change committed"
                );
                Outcome::Committed {
                    item_id: pending.item_id,
                    from: pending.from,
                    to: pending.to,
                }
            }
            Err(err) => {
                let reason = err.to_string();
                let restored = pending.snapshot.stage;
                if let Err(store_err) = store.restore(pending.snapshot) {
                    // Item vanished in a refresh while in flight; nothing to
                    // restore, but the failure is still surfaced.
                    tracing::warn!(
                        item_id = pending.item_id,
                        error = %store_err,
                        "rollback target missing"
                    );
                }
                store.push_notice(Notice::StageRolledBack {
                    item_id: pending.item_id.clone(),
                    restored,
                    attempted: pending.to,
                    reason: reason.clone(),
                });
                tracing::warn!(
                    item_id = pending.item_id,
                    attempted = %pending.to,
                    %reason,
                    "stage change rolled back"
                );
                Outcome::RolledBack {
                    item_id: pending.item_id,
                    reason,
                }
            }
        }
    }

    /// Both phases in one call, for hosts with a blocking gateway.
    ///
    /// # Errors
    ///
    /// [`TransitionError`] from [`Self::begin`]; gateway failures are not
    /// errors here; they surface as [`Outcome::RolledBack`].
    pub fn transition(
        &mut self,
        store: &mut WorkItemStore,
        gateway: &mut dyn StageGateway,
        item_id: &str,
        to: Stage,
        actor: &str,
        now_us: i64,
    ) -> Result<Outcome, TransitionError> {
        match self.begin(store, item_id, to, actor)? {
            Begun::Unchanged => Ok(Outcome::Unchanged),
            Begun::Pending(pending) => {
                let confirmation = gateway.request_stage_change(item_id, to, actor);
                Ok(Self::resolve(store, pending, confirmation, now_us))
            }
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => f.write_str("unchanged"),
            Self::Committed { item_id, from, to } => {
                write!(f, "{item_id}: {from} -> {to}")
            }
            Self::RolledBack { item_id, reason } => {
                write!(f, "{item_id}: rolled back ({reason})")
            }
        }
    }
}
