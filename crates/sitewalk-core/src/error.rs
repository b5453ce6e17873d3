use std::fmt;

/// Machine-readable error codes surfaced by the CLI in JSON error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    StoreNotFound,
    StoreOpenFailed,
    StoreSchemaMismatch,
    StoreReadFailed,
    InvalidDate,
    ChartWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::StoreNotFound => "E1101",
            Self::StoreOpenFailed => "E1102",
            Self::StoreSchemaMismatch => "E1103",
            Self::StoreReadFailed => "E1104",
            Self::InvalidDate => "E2005",
            Self::ChartWriteFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::StoreNotFound => "Inspection store not found",
            Self::StoreOpenFailed => "Inspection store could not be opened",
            Self::StoreSchemaMismatch => "Inspection store is missing required tables",
            Self::StoreReadFailed => "Inspection store query failed",
            Self::InvalidDate => "Invalid date value",
            Self::ChartWriteFailed => "Chart file write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .sitewalk/config.toml and retry."),
            Self::StoreNotFound => {
                Some("Pass `--db <path>`, set SITEWALK_DB, or set [store] path in config.")
            }
            Self::StoreOpenFailed => Some("Check the file is a SQLite database and readable."),
            Self::StoreSchemaMismatch => {
                Some("Point at the application database holding Apartment, Report and WorkItem.")
            }
            Self::StoreReadFailed => {
                Some("Retry once. If persistent, check the store for corruption.")
            }
            Self::InvalidDate => Some("Use YYYY-MM-DD or epoch milliseconds."),
            Self::ChartWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
