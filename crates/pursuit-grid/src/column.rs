//! Column descriptors and the registry of live column state.
//!
//! A column's render/edit behavior hangs off a single [`ColumnKind`] tag.
//! Adding a new kind is a one-place change: extend the enum and the `match`
//! arms that dispatch on it; nothing else in the grid special-cases columns.

use std::fmt;

/// Render/edit strategy tag. Closed set, dispatched through single matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Date,
    Currency,
    StageBadge,
    PriorityBadge,
    UserRef,
    ProgressBar,
    Link,
    /// Structural: per-row action menu, not data-bound.
    Actions,
    /// Structural: selection checkbox, not data-bound.
    Selector,
}

impl ColumnKind {
    /// Structural columns frame the grid; they carry no item data and are
    /// managed outside the show/hide mechanism for data columns.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(self, Self::Actions | Self::Selector)
    }

    /// Scalar kinds are the only ones inline editing may target.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        matches!(self, Self::Text | Self::Number | Self::Date | Self::Currency)
    }
}

/// Minimum width a resize can reach.
pub const MIN_WIDTH_PX: u16 = 50;

/// One column's identity and live display state.
#[derive(Debug, Clone)]
pub struct ColumnModel {
    pub key: String,
    pub label: String,
    pub kind: ColumnKind,
    pub width_px: u16,
    pub visible: bool,
    pub sortable: bool,
    pub filterable: bool,
    pub editable: bool,
    /// Frozen columns stay pinned at the grid edge when a renderer scrolls
    /// horizontally. Does not affect registration order.
    pub frozen: bool,
}

impl ColumnModel {
    /// A data column with the common flag defaults for its kind.
    #[must_use]
    pub fn data(key: &str, label: &str, kind: ColumnKind, width_px: u16) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            width_px,
            visible: true,
            sortable: !kind.is_structural(),
            filterable: !kind.is_structural(),
            editable: kind.is_scalar(),
            frozen: false,
        }
    }

    /// A structural (selector/actions) column.
    #[must_use]
    pub fn structural(key: &str, kind: ColumnKind, width_px: u16) -> Self {
        Self {
            key: key.to_string(),
            label: String::new(),
            kind,
            width_px,
            visible: true,
            sortable: false,
            filterable: false,
            editable: false,
            frozen: true,
        }
    }

    #[must_use]
    pub fn editable(mut self, flag: bool) -> Self {
        self.editable = flag && self.kind.is_scalar();
        self
    }

    #[must_use]
    pub fn frozen(mut self, flag: bool) -> Self {
        self.frozen = flag;
        self
    }
}

/// Error raised by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColumnError {
    #[error("unknown column '{0}'")]
    Unknown(String),
    #[error("column '{0}' is structural and cannot be hidden")]
    Structural(String),
}

/// Ordered set of columns; registration order is render order and is stable
/// across visibility toggles and resizes.
#[derive(Debug, Clone)]
pub struct ColumnRegistry {
    columns: Vec<ColumnModel>,
}

impl ColumnRegistry {
    #[must_use]
    pub fn new(columns: Vec<ColumnModel>) -> Self {
        Self { columns }
    }

    /// The standard pursuit column set used by both CLI and TUI hosts.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            ColumnModel::structural("_select", ColumnKind::Selector, 50),
            ColumnModel::data("id", "ID", ColumnKind::Text, 90)
                .editable(false)
                .frozen(true),
            ColumnModel::data("title", "Title", ColumnKind::Text, 260),
            ColumnModel::data("client", "Client", ColumnKind::Text, 160),
            ColumnModel::data("stage", "Stage", ColumnKind::StageBadge, 110),
            ColumnModel::data("priority", "Priority", ColumnKind::PriorityBadge, 100),
            ColumnModel::data("owner", "Owner", ColumnKind::UserRef, 130),
            ColumnModel::data("due_date", "Due", ColumnKind::Date, 110),
            ColumnModel::data("progress", "Progress", ColumnKind::ProgressBar, 110),
            ColumnModel::data("budget", "Budget", ColumnKind::Currency, 120),
            ColumnModel::data("estimated_hours", "Est. hrs", ColumnKind::Number, 90),
            ColumnModel::data("actual_hours", "Act. hrs", ColumnKind::Number, 90),
            ColumnModel::data("url", "Link", ColumnKind::Link, 140),
            ColumnModel::data("notes", "Notes", ColumnKind::Text, 220),
            ColumnModel::structural("_actions", ColumnKind::Actions, 60),
        ])
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ColumnModel> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// All columns, registration order.
    #[must_use]
    pub fn all(&self) -> &[ColumnModel] {
        &self.columns
    }

    /// Visible columns, registration order.
    #[must_use]
    pub fn visible(&self) -> Vec<&ColumnModel> {
        self.columns.iter().filter(|c| c.visible).collect()
    }

    /// Visible data-bound columns (structural frame columns excluded), the
    /// set exports operate on.
    #[must_use]
    pub fn visible_data(&self) -> Vec<&ColumnModel> {
        self.columns
            .iter()
            .filter(|c| c.visible && !c.kind.is_structural())
            .collect()
    }

    /// Flip a data column's visibility. Returns the new state.
    ///
    /// # Errors
    ///
    /// [`ColumnError::Structural`] for selector/actions columns,
    /// [`ColumnError::Unknown`] for unregistered keys.
    pub fn toggle_visible(&mut self, key: &str) -> Result<bool, ColumnError> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.key == key)
            .ok_or_else(|| ColumnError::Unknown(key.to_string()))?;
        if column.kind.is_structural() {
            return Err(ColumnError::Structural(key.to_string()));
        }
        column.visible = !column.visible;
        Ok(column.visible)
    }

    /// Resize a column, enforcing the width floor.
    ///
    /// # Errors
    ///
    /// [`ColumnError::Unknown`] for unregistered keys.
    pub fn resize(&mut self, key: &str, width_px: u16) -> Result<u16, ColumnError> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.key == key)
            .ok_or_else(|| ColumnError::Unknown(key.to_string()))?;
        column.width_px = width_px.max(MIN_WIDTH_PX);
        Ok(column.width_px)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Currency => "currency",
            Self::StageBadge => "stage",
            Self::PriorityBadge => "priority",
            Self::UserRef => "user",
            Self::ProgressBar => "progress",
            Self::Link => "link",
            Self::Actions => "actions",
            Self::Selector => "selector",
        };
        f.write_str(name)
    }
}
