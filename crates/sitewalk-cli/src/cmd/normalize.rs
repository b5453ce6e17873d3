//! `sw normalize`: map an inspector's free-text label to a stored code.

use std::io::{self, Write};

use clap::{Args, ValueEnum};
use serde::Serialize;
use sitewalk_core::model::{CanonicalState, WorkCategory, WorkStatus};

use crate::output::{OutputMode, pretty_kv, render_mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LabelKind {
    /// A status column label.
    Status,
    /// A section or trade heading.
    Category,
}

/// Arguments for `sw normalize`.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Which table to look the label up in.
    #[arg(value_enum)]
    pub kind: LabelKind,

    /// The label as written in the report.
    #[arg(value_name = "LABEL")]
    pub label: String,
}

/// Payload for `sw normalize`.
#[derive(Debug, Serialize)]
pub struct Normalized {
    pub label: String,
    pub code: &'static str,
    pub display_name: &'static str,
    /// Progress state the code counts as; statuses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<CanonicalState>,
}

/// Look a label up without touching the store.
pub fn normalize(kind: LabelKind, label: &str) -> Normalized {
    match kind {
        LabelKind::Status => {
            let status = WorkStatus::from_label(label);
            Normalized {
                label: label.to_string(),
                code: status.as_str(),
                display_name: status.display_name(),
                canonical: Some(status.canonical()),
            }
        }
        LabelKind::Category => {
            let category = WorkCategory::from_label(label);
            Normalized {
                label: label.to_string(),
                code: category.as_str(),
                display_name: category.display_name(),
                canonical: None,
            }
        }
    }
}

/// Execute `sw normalize`.
pub fn run_normalize(args: &NormalizeArgs, output: OutputMode) -> anyhow::Result<()> {
    let result = normalize(args.kind, &args.label);
    render_mode(output, &result, render_text, render_pretty)
}

fn render_text(result: &Normalized, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", result.code)
}

fn render_pretty(result: &Normalized, w: &mut dyn Write) -> io::Result<()> {
    pretty_kv(w, "Label", &result.label)?;
    pretty_kv(w, "Code", result.code)?;
    pretty_kv(w, "Name", result.display_name)?;
    if let Some(state) = result.canonical {
        pretty_kv(w, "Counts as", state.as_str())?;
    }
    Ok(())
}
