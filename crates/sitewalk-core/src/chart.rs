//! Chart series files.
//!
//! Each apartment gets three JSON documents holding exactly the series a
//! renderer plots: cumulative state counts, completion percentage against a
//! 100% reference line, and per-report open defects.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::aggregate::{DefectHistoryPoint, ProgressRow};
use crate::error::ErrorCode;
use crate::model::date::date_label;

/// Completion percentage drawn as the target line.
pub const REFERENCE_PCT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Multistate,
    Percentage,
    Defects,
}

impl ChartKind {
    pub const ALL: [Self; 3] = [Self::Multistate, Self::Percentage, Self::Defects];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Multistate => "multistate",
            Self::Percentage => "percentage",
            Self::Defects => "defects",
        }
    }
}

/// `<prefix>_<apartment>_<kind>.json`
///
/// Apartment numbers come from the store, so anything outside
/// `[A-Za-z0-9.-]` is replaced with `_` to keep the name a single path
/// component.
#[must_use]
pub fn chart_file_name(prefix: &str, apartment: &str, kind: ChartKind) -> String {
    let apartment: String = apartment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{prefix}_{apartment}_{}.json", kind.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series<P> {
    pub category: String,
    pub points: Vec<P>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultistatePoint {
    pub date: String,
    pub report_date_ms: i64,
    pub cumulative_ok: u64,
    pub cumulative_defect: u64,
    pub cumulative_pending: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentagePoint {
    pub date: String,
    pub report_date_ms: i64,
    pub completion_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefectPoint {
    pub date: String,
    pub report_date_ms: i64,
    pub pending_defects: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultistateChart {
    pub apartment: String,
    pub title: String,
    pub series: Vec<Series<MultistatePoint>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentageChart {
    pub apartment: String,
    pub title: String,
    pub reference_pct: f64,
    pub series: Vec<Series<PercentagePoint>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefectChart {
    pub apartment: String,
    pub title: String,
    pub series: Vec<Series<DefectPoint>>,
}

/// The three charts of one apartment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApartmentCharts {
    pub apartment: String,
    pub multistate: MultistateChart,
    pub percentage: PercentageChart,
    pub defects: DefectChart,
}

fn into_series<P>(by_category: BTreeMap<&str, Vec<P>>) -> Vec<Series<P>> {
    by_category
        .into_iter()
        .map(|(category, points)| Series {
            category: category.to_string(),
            points,
        })
        .collect()
}

/// Group progress and defect rows into per-apartment chart documents.
///
/// One entry is produced for every apartment present in `progress`. Input
/// order is preserved within a series, so rows sorted by date give series
/// sorted by date.
#[must_use]
pub fn build_charts(
    progress: &[ProgressRow],
    history: &[DefectHistoryPoint],
) -> Vec<ApartmentCharts> {
    let mut multistate: BTreeMap<&str, BTreeMap<&str, Vec<MultistatePoint>>> = BTreeMap::new();
    let mut percentage: BTreeMap<&str, BTreeMap<&str, Vec<PercentagePoint>>> = BTreeMap::new();

    for row in progress {
        let cumulative = &row.row;
        let apartment = cumulative.apartment.as_str();
        let category = cumulative.category.as_str();
        let date = date_label(cumulative.report_date_ms);

        multistate
            .entry(apartment)
            .or_default()
            .entry(category)
            .or_default()
            .push(MultistatePoint {
                date: date.clone(),
                report_date_ms: cumulative.report_date_ms,
                cumulative_ok: cumulative.cumulative_ok,
                cumulative_defect: cumulative.cumulative_defect,
                cumulative_pending: cumulative.cumulative_pending,
            });
        percentage
            .entry(apartment)
            .or_default()
            .entry(category)
            .or_default()
            .push(PercentagePoint {
                date,
                report_date_ms: cumulative.report_date_ms,
                completion_pct: row.completion_pct,
            });
    }

    let mut defects: BTreeMap<&str, BTreeMap<&str, Vec<DefectPoint>>> = BTreeMap::new();
    for point in history {
        defects
            .entry(point.apartment.as_str())
            .or_default()
            .entry(point.category.as_str())
            .or_default()
            .push(DefectPoint {
                date: date_label(point.report_date_ms),
                report_date_ms: point.report_date_ms,
                pending_defects: point.pending_defects,
            });
    }

    multistate
        .into_iter()
        .map(|(apartment, states)| {
            let pct = percentage.remove(apartment).unwrap_or_default();
            let open = defects.remove(apartment).unwrap_or_default();
            ApartmentCharts {
                apartment: apartment.to_string(),
                multistate: MultistateChart {
                    apartment: apartment.to_string(),
                    title: format!("Apartment {apartment} - Multi-State Progress"),
                    series: into_series(states),
                },
                percentage: PercentageChart {
                    apartment: apartment.to_string(),
                    title: format!("Apartment {apartment} - Completion Percentage"),
                    reference_pct: REFERENCE_PCT,
                    series: into_series(pct),
                },
                defects: DefectChart {
                    apartment: apartment.to_string(),
                    title: format!("Apartment {apartment} - Defect History"),
                    series: into_series(open)
                        .into_iter()
                        .filter(|series| series.points.iter().any(|p| p.pending_defects > 0))
                        .collect(),
                },
            }
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ChartWriteError {
    #[error("failed to create chart directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write chart file {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode chart {}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ChartWriteError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::ChartWriteFailed
    }
}

/// A chart file written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenChart {
    pub apartment: String,
    pub kind: ChartKind,
    pub path: PathBuf,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ChartWriteError> {
    let mut body = serde_json::to_vec_pretty(value).map_err(|source| ChartWriteError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    body.push(b'\n');
    fs::write(path, body).map_err(|source| ChartWriteError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write every chart under `dir`, creating it if needed.
///
/// Existing files with the same names are replaced.
///
/// # Errors
///
/// Returns [`ChartWriteError`] on the first directory or file failure.
pub fn write_charts(
    dir: &Path,
    prefix: &str,
    charts: &[ApartmentCharts],
) -> Result<Vec<WrittenChart>, ChartWriteError> {
    fs::create_dir_all(dir).map_err(|source| ChartWriteError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(charts.len() * ChartKind::ALL.len());
    for chart in charts {
        for kind in ChartKind::ALL {
            let path = dir.join(chart_file_name(prefix, &chart.apartment, kind));
            match kind {
                ChartKind::Multistate => write_json(&path, &chart.multistate)?,
                ChartKind::Percentage => write_json(&path, &chart.percentage)?,
                ChartKind::Defects => write_json(&path, &chart.defects)?,
            }
            tracing::debug!(path = %path.display(), "chart written");
            written.push(WrittenChart {
                apartment: chart.apartment.clone(),
                kind,
                path,
            });
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::item;
    use crate::aggregate::{ReportFilter, build_snapshot_counts, defect_history, progress_table};

    fn sample_charts() -> Vec<ApartmentCharts> {
        let items = vec![
            item("7", 100, "Plumbing", "COMPLETED"),
            item("7", 100, "Plumbing", "DEFECT"),
            item("7", 200, "Plumbing", "COMPLETED"),
            item("9", 100, "Paint", "PENDING"),
        ];
        let filter = ReportFilter::default();
        let progress = progress_table(&build_snapshot_counts(&items, &filter));
        let history = defect_history(&items, &filter);
        build_charts(&progress, &history)
    }

    #[test]
    fn file_names_follow_prefix_apartment_kind() {
        assert_eq!(
            chart_file_name("apt", "7", ChartKind::Multistate),
            "apt_7_multistate.json"
        );
        assert_eq!(
            chart_file_name("unit", "12", ChartKind::Defects),
            "unit_12_defects.json"
        );
    }

    #[test]
    fn apartment_numbers_stay_one_path_component() {
        assert_eq!(
            chart_file_name("apt", "3/4", ChartKind::Multistate),
            "apt_3_4_multistate.json"
        );
        assert_eq!(
            chart_file_name("apt", "..\\B 2", ChartKind::Defects),
            "apt_.._B_2_defects.json"
        );
        assert_eq!(
            chart_file_name("apt", "12-A", ChartKind::Percentage),
            "apt_12-A_percentage.json"
        );
    }

    #[test]
    fn defect_chart_skips_categories_that_never_had_defects() {
        let items = vec![
            item("7", 100, "Plumbing", "DEFECT"),
            item("7", 100, "Paint", "COMPLETED"),
            item("7", 200, "Paint", "PENDING"),
            item("7", 200, "Plumbing", "COMPLETED"),
        ];
        let filter = ReportFilter::default();
        let progress = progress_table(&build_snapshot_counts(&items, &filter));
        let history = defect_history(&items, &filter);
        assert_eq!(history.len(), 4, "history itself stays zero-filled");

        let charts = build_charts(&progress, &history);
        let categories: Vec<&str> = charts[0]
            .defects
            .series
            .iter()
            .map(|s| s.category.as_str())
            .collect();
        assert_eq!(categories, vec!["Plumbing"]);
        assert_eq!(charts[0].multistate.series.len(), 2);
    }

    #[test]
    fn one_chart_set_per_apartment() {
        let charts = sample_charts();
        let apartments: Vec<&str> = charts.iter().map(|c| c.apartment.as_str()).collect();
        assert_eq!(apartments, vec!["7", "9"]);
    }

    #[test]
    fn series_follow_report_dates() {
        let charts = sample_charts();
        let seven = &charts[0];

        let plumbing = &seven.multistate.series[0];
        assert_eq!(plumbing.category, "Plumbing");
        let ok: Vec<u64> = plumbing.points.iter().map(|p| p.cumulative_ok).collect();
        assert_eq!(ok, vec![1, 2]);

        let pct: Vec<f64> = seven.percentage.series[0]
            .points
            .iter()
            .map(|p| p.completion_pct)
            .collect();
        assert!((pct[0] - 100.0 / 3.0).abs() < 1e-9);
        assert!((pct[1] - 200.0 / 3.0).abs() < 1e-9);
        assert!((seven.percentage.reference_pct - 100.0).abs() < f64::EPSILON);

        let open: Vec<u64> = seven.defects.series[0]
            .points
            .iter()
            .map(|p| p.pending_defects)
            .collect();
        assert_eq!(open, vec![1, 0]);
    }

    #[test]
    fn write_creates_directory_and_three_files_per_apartment() {
        let root = tempfile::tempdir().expect("temp dir");
        let dir = root.path().join("nested/chart_output");
        let written = write_charts(&dir, "apt", &sample_charts()).expect("write charts");

        assert_eq!(written.len(), 6);
        for chart in &written {
            assert!(chart.path.exists(), "{} missing", chart.path.display());
        }

        let raw = std::fs::read_to_string(dir.join("apt_7_percentage.json")).expect("read");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value["apartment"], "7");
        assert_eq!(value["reference_pct"], 100.0);
        assert_eq!(value["series"][0]["category"], "Plumbing");
    }

    #[test]
    fn slash_in_apartment_number_does_not_stop_later_apartments() {
        let items = vec![
            item("3/4", 100, "Plumbing", "DEFECT"),
            item("7", 100, "Plumbing", "COMPLETED"),
        ];
        let filter = ReportFilter::default();
        let progress = progress_table(&build_snapshot_counts(&items, &filter));
        let charts = build_charts(&progress, &defect_history(&items, &filter));

        let root = tempfile::tempdir().expect("temp dir");
        let written = write_charts(root.path(), "apt", &charts).expect("write charts");

        assert_eq!(written.len(), 6);
        assert!(root.path().join("apt_3_4_multistate.json").exists());
        assert!(root.path().join("apt_7_defects.json").exists());
        assert!(!root.path().join("apt_3").exists());
        assert_eq!(written[0].apartment, "3/4");
    }

    #[test]
    fn write_into_a_file_path_fails_with_chart_code() {
        let root = tempfile::tempdir().expect("temp dir");
        let blocker = root.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").expect("write blocker");

        let err = write_charts(&blocker, "apt", &sample_charts()).expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::ChartWriteFailed);
    }
}
