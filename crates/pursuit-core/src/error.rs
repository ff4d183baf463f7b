use std::fmt;

/// Machine-readable error codes surfaced alongside human messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    ItemNotFound,
    IllegalStageTransition,
    NonEditableColumn,
    InvalidCellValue,
    UnknownColumn,
    StageChangeRejected,
    CellPersistRejected,
    ExportWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::ItemNotFound => "E2001",
            Self::IllegalStageTransition => "E2002",
            Self::NonEditableColumn => "E2003",
            Self::InvalidCellValue => "E2004",
            Self::UnknownColumn => "E2005",
            Self::StageChangeRejected => "E4001",
            Self::CellPersistRejected => "E4002",
            Self::ExportWriteFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::ItemNotFound => "Item not found",
            Self::IllegalStageTransition => "Illegal stage transition",
            Self::NonEditableColumn => "Column is not editable",
            Self::InvalidCellValue => "Invalid cell value",
            Self::UnknownColumn => "Unknown column key",
            Self::StageChangeRejected => "Stage change rejected by the backend",
            Self::CellPersistRejected => "Cell edit rejected by the backend",
            Self::ExportWriteFailed => "Export file write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .pursuit/config.toml and retry."),
            Self::ItemNotFound => None,
            Self::IllegalStageTransition => {
                Some("Check the active lifecycle policy with `pur stages`.")
            }
            Self::NonEditableColumn => Some("Only scalar data columns accept inline edits."),
            Self::InvalidCellValue => Some("Enter a value matching the column kind."),
            Self::UnknownColumn => Some("List registered columns with `pur list --wide`."),
            Self::StageChangeRejected => Some("The item was restored; retry manually if needed."),
            Self::CellPersistRejected => Some("The previous value is still in effect."),
            Self::ExportWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
