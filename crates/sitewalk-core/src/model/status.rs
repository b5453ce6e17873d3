use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The progress bucket a raw status code falls into.
///
/// Ordering follows declaration order, which is also the order snapshot
/// counts are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CanonicalState {
    Ok,
    Defect,
    Pending,
    Info,
}

impl CanonicalState {
    /// States that take part in progress accounting.
    pub const TRACKED: [Self; 3] = [Self::Ok, Self::Defect, Self::Pending];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Defect => "DEFECT",
            Self::Pending => "PENDING",
            Self::Info => "INFO",
        }
    }

    /// `false` only for [`CanonicalState::Info`].
    #[must_use]
    pub const fn is_tracked(self) -> bool {
        !matches!(self, Self::Info)
    }
}

impl fmt::Display for CanonicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw status code stored on a work item to its canonical state.
///
/// Matching is exact. Codes outside the table (including `HANDLED`,
/// `NOT_STARTED` and anything unknown) land in [`CanonicalState::Info`] and
/// are left out of progress math.
#[must_use]
pub fn map_status(raw: &str) -> CanonicalState {
    match raw {
        "COMPLETED" | "COMPLETED_OK" => CanonicalState::Ok,
        "DEFECT" | "NOT_OK" => CanonicalState::Defect,
        "IN_PROGRESS" | "PENDING" => CanonicalState::Pending,
        _ => CanonicalState::Info,
    }
}

/// Status codes written by the upstream report extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkStatus {
    Completed,
    CompletedOk,
    NotOk,
    Defect,
    InProgress,
    Handled,
    Pending,
    NotStarted,
}

/// Inspector labels, in match priority order for containment lookups.
const STATUS_LABELS: &[(&str, WorkStatus)] = &[
    ("בוצע", WorkStatus::Completed),
    ("בוצע - תקין", WorkStatus::CompletedOk),
    ("תקין", WorkStatus::CompletedOk),
    ("לא תקין", WorkStatus::NotOk),
    ("ליקוי", WorkStatus::Defect),
    ("בטיפול", WorkStatus::InProgress),
    ("טופל", WorkStatus::Handled),
    ("ממתין", WorkStatus::Pending),
    ("לא התחיל", WorkStatus::NotStarted),
    ("בביצוע", WorkStatus::InProgress),
    ("הושלם", WorkStatus::Completed),
    ("נמצא ליקוי", WorkStatus::Defect),
    ("תוקן", WorkStatus::Handled),
    ("קיימים אי תאומים", WorkStatus::Defect),
    ("קיימים אי תיאומים", WorkStatus::Defect),
    ("אי תאומים", WorkStatus::Defect),
    ("אי תיאומים", WorkStatus::Defect),
    ("יש הערות", WorkStatus::Defect),
    ("בוצע - יש הערות", WorkStatus::Defect),
    ("בוצע - יש ליקויים", WorkStatus::Defect),
    ("בוצע - נמצאו אי תאומים", WorkStatus::Defect),
    ("בוצע - נמצאו אי תיאומים", WorkStatus::Defect),
    ("נמצאו אי תאומים", WorkStatus::Defect),
    ("נמצאו אי תיאומים", WorkStatus::Defect),
    ("בוצע חלקי", WorkStatus::InProgress),
    ("לטיפול", WorkStatus::Pending),
    ("נדרש מעקב", WorkStatus::Pending),
    ("נדרש ביצוע", WorkStatus::Pending),
    ("בוצע עם הערות", WorkStatus::Defect),
];

impl WorkStatus {
    pub const ALL: [Self; 8] = [
        Self::Completed,
        Self::CompletedOk,
        Self::NotOk,
        Self::Defect,
        Self::InProgress,
        Self::Handled,
        Self::Pending,
        Self::NotStarted,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::CompletedOk => "COMPLETED_OK",
            Self::NotOk => "NOT_OK",
            Self::Defect => "DEFECT",
            Self::InProgress => "IN_PROGRESS",
            Self::Handled => "HANDLED",
            Self::Pending => "PENDING",
            Self::NotStarted => "NOT_STARTED",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::CompletedOk => "Completed OK",
            Self::NotOk => "Not OK",
            Self::Defect => "Defect",
            Self::InProgress => "In Progress",
            Self::Handled => "Handled",
            Self::Pending => "Pending",
            Self::NotStarted => "Not Started",
        }
    }

    #[must_use]
    pub fn canonical(self) -> CanonicalState {
        map_status(self.as_str())
    }

    /// Normalize a free-text inspector label into a status code.
    ///
    /// An exact (trimmed) match wins; otherwise the first known label
    /// contained in the text is used. Unrecognized labels default to
    /// [`WorkStatus::InProgress`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();

        if let Some((_, status)) = STATUS_LABELS.iter().find(|(known, _)| *known == trimmed) {
            return *status;
        }

        if let Some((_, status)) = STATUS_LABELS
            .iter()
            .find(|(known, _)| trimmed.contains(known))
        {
            return *status;
        }

        tracing::warn!(label, "unknown status label, defaulting to IN_PROGRESS");
        Self::InProgress
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| anyhow::anyhow!("unknown status code '{s}'"))
    }
}
