//! Shared observable collection of work items.
//!
//! Every view (grid, board, summary widgets) renders from the same store
//! instance and re-derives its rows whenever [`WorkItemStore::version`]
//! changes, so a single synchronous mutation pass updates all of them at
//! once. Views never hold their own copies of the collection.
//!
//! The store is read-mostly. The sanctioned mutation paths are:
//! - stage writes via the transition coordinator ([`crate::transition`]),
//! - confirmed cell writes via [`WorkItemStore::apply_confirmed_cell`],
//! - whole-collection refresh via [`WorkItemStore::replace_all`].
//!
//! Outcome events accumulate in a notice queue the host drains each frame to
//! feed its toast/notification layer.

use std::collections::VecDeque;

use crate::model::item::{Stage, WorkItem};
use crate::model::value::CellValue;

/// Drainable event for the hosting view's notification layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    StageCommitted {
        item_id: String,
        from: Stage,
        to: Stage,
        actor: String,
    },
    StageRolledBack {
        item_id: String,
        restored: Stage,
        attempted: Stage,
        reason: String,
    },
    CellCommitted {
        item_id: String,
        column_key: String,
    },
    CollectionRefreshed {
        count: usize,
    },
}

/// Error raised when a store operation targets an unknown item or field.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("item '{0}' not found")]
    ItemNotFound(String),
    #[error("item '{id}' has no field '{key}'")]
    UnknownField { id: String, key: String },
}

/// The single shared collection behind all views.
#[derive(Debug, Default)]
pub struct WorkItemStore {
    items: Vec<WorkItem>,
    version: u64,
    notices: VecDeque<Notice>,
}

impl WorkItemStore {
    #[must_use]
    pub fn new(items: Vec<WorkItem>) -> Self {
        Self {
            items,
            version: 0,
            notices: VecDeque::new(),
        }
    }

    /// The full collection in original fetch order.
    #[must_use]
    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    /// Monotonic change counter. Views re-derive when this moves.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WorkItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Replace the whole collection (external refetch landed).
    pub fn replace_all(&mut self, items: Vec<WorkItem>) {
        let count = items.len();
        self.items = items;
        self.bump();
        self.notices.push_back(Notice::CollectionRefreshed { count });
        tracing::debug!(count, "collection refreshed");
    }

    /// Write a stage in place and return the prior stage.
    ///
    /// Crate-private: stage writes must flow through the transition
    /// coordinator so every change carries a rollback snapshot.
    pub(crate) fn set_stage(&mut self, id: &str, stage: Stage) -> Result<Stage, StoreError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| StoreError::ItemNotFound(id.to_string()))?;
        let prior = item.stage;
        item.stage = stage;
        self.bump();
        Ok(prior)
    }

    /// Restore an item exactly from a pre-transition snapshot, in place.
    pub(crate) fn restore(&mut self, snapshot: WorkItem) -> Result<(), StoreError> {
        let slot = self
            .items
            .iter_mut()
            .find(|item| item.id == snapshot.id)
            .ok_or_else(|| StoreError::ItemNotFound(snapshot.id.clone()))?;
        *slot = snapshot;
        self.bump();
        Ok(())
    }

    /// Apply a cell value that the external persist layer has confirmed.
    ///
    /// Inline edits are not optimistic: the grid keeps rendering the old
    /// value until the host receives confirmation and calls this.
    pub fn apply_confirmed_cell(
        &mut self,
        id: &str,
        key: &str,
        value: CellValue,
        now_us: i64,
    ) -> Result<(), StoreError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| StoreError::ItemNotFound(id.to_string()))?;
        item.set_value(key, value).map_err(|e| StoreError::UnknownField {
            id: id.to_string(),
            key: e.key,
        })?;
        item.updated_at_us = now_us;
        self.bump();
        self.notices.push_back(Notice::CellCommitted {
            item_id: id.to_string(),
            column_key: key.to_string(),
        });
        Ok(())
    }

    pub(crate) fn push_notice(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    /// Hand all pending notices to the host, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub(crate) fn touch_updated(&mut self, id: &str, now_us: i64) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.updated_at_us = now_us;
        }
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}
