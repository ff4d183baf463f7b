//! pursuit-grid library.
//!
//! The client-side tabular engine: column registry, transient grid state,
//! the pure filter/sort/paginate pipeline, selection semantics, inline cell
//! editing, and delimited export. Everything recomputes synchronously from
//! `(collection, state)`; nothing here talks to a backend except through
//! the [`edit::CellGateway`] seam.

pub mod column;
pub mod edit;
pub mod engine;
pub mod export;
pub mod selection;
pub mod state;

pub use column::{ColumnKind, ColumnModel, ColumnRegistry};
pub use engine::GridPage;
pub use selection::SelectionManager;
pub use state::{GridState, SortDirection};
