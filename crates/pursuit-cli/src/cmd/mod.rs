//! Subcommand handlers. Each receives its parsed args plus the shared
//! output mode and renders pretty or JSON accordingly.

pub mod export;
pub mod list;
pub mod move_cmd;
pub mod stages;
