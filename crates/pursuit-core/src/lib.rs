//! pursuit-core library.
//!
//! Domain model, stage lifecycle, shared work-item store, and the optimistic
//! transition protocol. Everything here is UI-free and synchronous; the two
//! gateway traits are the only seams that reach outside the process.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod store;
pub mod transition;

/// # Conventions
///
/// - **Errors**: typed `thiserror` enums at library seams, `anyhow::Result`
///   at binary boundaries.
/// - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`).
pub use model::item::{Priority, Stage, WorkItem};
pub use model::value::CellValue;
