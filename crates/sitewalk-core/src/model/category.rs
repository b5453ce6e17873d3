use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade categories used to group work items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkCategory {
    Electrical,
    Plumbing,
    Ac,
    EntryDoor,
    Sanitary,
    Flooring,
    Tiling,
    Sprinklers,
    Waterproofing,
    Painting,
    Windows,
    Kitchen,
    General,
    Development,
}

const CATEGORY_LABELS: &[(&str, WorkCategory)] = &[
    ("חשמל", WorkCategory::Electrical),
    ("אינסטלציה", WorkCategory::Plumbing),
    ("מיזוג", WorkCategory::Ac),
    ("מיזוג אויר", WorkCategory::Ac),
    ("דלת כניסה", WorkCategory::EntryDoor),
    ("סניטריה", WorkCategory::Sanitary),
    ("ריצוף", WorkCategory::Flooring),
    ("חיפוי", WorkCategory::Tiling),
    ("ספרינקלרים", WorkCategory::Sprinklers),
    ("ספרינקלר", WorkCategory::Sprinklers),
    ("איטום", WorkCategory::Waterproofing),
    ("צביעה", WorkCategory::Painting),
    ("חלונות", WorkCategory::Windows),
    ("מטבח", WorkCategory::Kitchen),
    ("כללי", WorkCategory::General),
    ("פיתוח", WorkCategory::Development),
    ("עבודות פיתוח", WorkCategory::Development),
];

impl WorkCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electrical => "ELECTRICAL",
            Self::Plumbing => "PLUMBING",
            Self::Ac => "AC",
            Self::EntryDoor => "ENTRY_DOOR",
            Self::Sanitary => "SANITARY",
            Self::Flooring => "FLOORING",
            Self::Tiling => "TILING",
            Self::Sprinklers => "SPRINKLERS",
            Self::Waterproofing => "WATERPROOFING",
            Self::Painting => "PAINTING",
            Self::Windows => "WINDOWS",
            Self::Kitchen => "KITCHEN",
            Self::General => "GENERAL",
            Self::Development => "DEVELOPMENT",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Electrical => "Electrical",
            Self::Plumbing => "Plumbing",
            Self::Ac => "Air Conditioning",
            Self::EntryDoor => "Entry Door",
            Self::Sanitary => "Sanitary",
            Self::Flooring => "Flooring",
            Self::Tiling => "Tiling",
            Self::Sprinklers => "Sprinklers",
            Self::Waterproofing => "Waterproofing",
            Self::Painting => "Painting",
            Self::Windows => "Windows",
            Self::Kitchen => "Kitchen",
            Self::General => "General",
            Self::Development => "Development",
        }
    }

    /// Normalize a free-text category heading. Falls back to
    /// [`WorkCategory::General`] when nothing matches.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();

        if let Some((_, category)) = CATEGORY_LABELS.iter().find(|(known, _)| *known == trimmed) {
            return *category;
        }

        if let Some((_, category)) = CATEGORY_LABELS
            .iter()
            .find(|(known, _)| trimmed.contains(known))
        {
            return *category;
        }

        tracing::warn!(label, "unknown category label, defaulting to GENERAL");
        Self::General
    }
}

impl fmt::Display for WorkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
