use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::error::ErrorCode;

/// Store location used when nothing else is configured, relative to the
/// project root.
pub const DEFAULT_STORE_PATH: &str = "prisma/dev.db";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub charts: ChartConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_chart_prefix")]
    pub prefix: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_dir: default_chart_dir(),
            prefix: default_chart_prefix(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Keep reports flagged `hasErrors` in aggregations.
    #[serde(default)]
    pub include_errored: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
    pub store_path: PathBuf,
}

/// A config file exists but is not valid TOML for its schema.
#[derive(Debug, thiserror::Error)]
#[error("failed to parse {}: {source}", .path.display())]
pub struct ConfigParseError {
    pub path: PathBuf,
    #[source]
    pub source: toml::de::Error,
}

impl ConfigParseError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::ConfigParseError
    }
}

fn load_toml<T>(path: &Path) -> Result<Option<T>>
where
    T: for<'de> Deserialize<'de>,
{
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<T>(&content)
        .map(Some)
        .map_err(|source| {
            ConfigParseError {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
}

/// Load `.sitewalk/config.toml` under `project_root`, or defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    Ok(load_toml(&project_root.join(".sitewalk/config.toml"))?.unwrap_or_default())
}

/// Load `<config dir>/sitewalk/config.toml`, or defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };
    Ok(load_toml(&config_dir.join("sitewalk/config.toml"))?.unwrap_or_default())
}

/// Merge project config, user config, environment and CLI flags.
///
/// # Errors
///
/// Returns an error if either config file fails to load.
pub fn resolve_config(
    project_root: &Path,
    cli_json: bool,
    cli_store: Option<&Path>,
) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.clone(), env_format)?;

    let env_store = env::var_os("SITEWALK_DB").map(PathBuf::from);
    let store_path = resolve_store_path(
        project_root,
        cli_store,
        env_store.as_deref(),
        project.store.path.as_deref(),
        user.store_path.as_deref(),
    );
    tracing::debug!(
        store = %store_path.display(),
        output = %resolved_output,
        "configuration resolved"
    );

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
        store_path,
    })
}

/// First configured store path wins: CLI, `SITEWALK_DB`, project, user.
/// Relative paths are taken from `project_root`.
fn resolve_store_path(
    project_root: &Path,
    cli_store: Option<&Path>,
    env_store: Option<&Path>,
    project_store: Option<&Path>,
    user_store: Option<&Path>,
) -> PathBuf {
    let chosen = cli_store
        .or(env_store)
        .or(project_store)
        .or(user_store)
        .unwrap_or_else(|| Path::new(DEFAULT_STORE_PATH));

    if chosen.is_absolute() {
        chosen.to_path_buf()
    } else {
        project_root.join(chosen)
    }
}

/// Canonical output mode name for a configured value.
#[must_use]
pub fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" => Some("pretty"),
        "text" => Some("text"),
        "json" => Some("json"),
        // legacy compatibility
        "human" => Some("pretty"),
        "table" | "tsv" => Some("text"),
        _ => None,
    }
}

fn resolve_output(
    cli_json: bool,
    user_output: Option<String>,
    env_format: Option<String>,
) -> Result<String> {
    if cli_json {
        return Ok("json".to_string());
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return Ok(mode.to_string());
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return Ok(mode.to_string());
    }

    if std::io::stdout().is_terminal() {
        Ok("pretty".to_string())
    } else {
        Ok("text".to_string())
    }
}

fn default_chart_dir() -> PathBuf {
    PathBuf::from("chart_output")
}

fn default_chart_prefix() -> String {
    "apt".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = tempfile::tempdir().expect("temp dir");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert!(cfg.store.path.is_none());
        assert_eq!(cfg.charts.output_dir, PathBuf::from("chart_output"));
        assert_eq!(cfg.charts.prefix, "apt");
        assert!(!cfg.reports.include_errored);
    }

    #[test]
    fn project_config_parses_sections() {
        let root = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir_all(root.path().join(".sitewalk")).expect("create dir");
        std::fs::write(
            root.path().join(".sitewalk/config.toml"),
            r#"
[store]
path = "data/site.db"

[charts]
prefix = "unit"

[reports]
include_errored = true
"#,
        )
        .expect("write config");

        let cfg = load_project_config(root.path()).expect("load");
        assert_eq!(cfg.store.path, Some(PathBuf::from("data/site.db")));
        assert_eq!(cfg.charts.prefix, "unit");
        assert_eq!(cfg.charts.output_dir, PathBuf::from("chart_output"));
        assert!(cfg.reports.include_errored);
    }

    #[test]
    fn broken_project_config_is_a_typed_parse_error() {
        let root = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir_all(root.path().join(".sitewalk")).expect("create dir");
        std::fs::write(root.path().join(".sitewalk/config.toml"), "[store\npath = 1")
            .expect("write config");

        let err = load_project_config(root.path()).expect_err("parse must fail");
        let parse = err
            .downcast_ref::<ConfigParseError>()
            .expect("typed parse error");
        assert_eq!(parse.code(), ErrorCode::ConfigParseError);
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        let output = resolve_output(true, Some("pretty".to_string()), Some("text".to_string()))
            .expect("resolve should succeed");
        assert_eq!(output, "json");
    }

    #[test]
    fn legacy_aliases_are_normalized() {
        let pretty = resolve_output(false, Some("table".to_string()), Some("human".to_string()))
            .expect("resolve should succeed");
        assert_eq!(pretty, "pretty");

        let text = resolve_output(false, Some("human".to_string()), Some("table".to_string()))
            .expect("resolve should succeed");
        assert_eq!(text, "text");
    }

    #[test]
    fn store_path_precedence() {
        let root = Path::new("/srv/site");
        let cli = Path::new("/tmp/cli.db");
        let env_db = Path::new("env.db");
        let project = Path::new("project.db");
        let user = Path::new("/home/u/user.db");

        assert_eq!(
            resolve_store_path(root, Some(cli), Some(env_db), Some(project), Some(user)),
            PathBuf::from("/tmp/cli.db")
        );
        assert_eq!(
            resolve_store_path(root, None, Some(env_db), Some(project), Some(user)),
            PathBuf::from("/srv/site/env.db")
        );
        assert_eq!(
            resolve_store_path(root, None, None, Some(project), Some(user)),
            PathBuf::from("/srv/site/project.db")
        );
        assert_eq!(
            resolve_store_path(root, None, None, None, Some(user)),
            PathBuf::from("/home/u/user.db")
        );
        assert_eq!(
            resolve_store_path(root, None, None, None, None),
            PathBuf::from("/srv/site/prisma/dev.db")
        );
    }

    #[test]
    fn user_config_parses() {
        let cfg: UserConfig = toml::from_str(
            r#"
output = "json"
store_path = "/data/dev.db"
"#,
        )
        .expect("parse");
        assert_eq!(cfg.output.as_deref(), Some("json"));
        assert_eq!(cfg.store_path, Some(PathBuf::from("/data/dev.db")));
    }
}
