use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the local application data folder holding the config file.
pub const CONFIG_DIR_NAME: &str = "GenericShellEx";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// One entry under `types`. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuEntryConfig {
    pub title: String,
    pub tool_tip: String,
    pub icon: String,
    pub command: String,
}

/// On-disk shape before validation; anything of the wrong JSON type is dropped later.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawConfig {
    log_file: Value,
    types: Value,
}

/// A config value that was dropped while parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigWarning {
    #[error("Ignoring non-string logFile: {value}")]
    LogFileNotString { value: String },
    #[error("Ignoring non-object types: {value}")]
    TypesNotObject { value: String },
    #[error("Ignoring non-object type entry {type_key}")]
    EntryNotObject { type_key: String },
    #[error("Ignoring malformed type entry {type_key}: {error}")]
    MalformedEntry { type_key: String, error: String },
}

/// Extension configuration read once per module load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionConfig {
    /// Log file path with environment references already expanded.
    pub log_file: Option<PathBuf>,
    /// Menu entries keyed by type (`*`, `Directory`, `Directory\Background`).
    pub types: BTreeMap<String, MenuEntryConfig>,
    /// Values skipped while parsing. Parsing runs before the log file is open,
    /// so these are reported later through [`ExtensionConfig::log_warnings`].
    pub warnings: Vec<ConfigWarning>,
}

impl ExtensionConfig {
    /// The config file path (`<LocalAppData>\GenericShellEx\config.json`)
    pub fn default_path() -> Result<PathBuf> {
        let local_app_data =
            dirs::data_local_dir().context("Failed to get local application data directory")?;
        Ok(local_app_data.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from `path`. A missing file is an empty configuration.
    pub fn load_from_path(path: &Path) -> Result<ExtensionConfig> {
        if !path.exists() {
            tracing::info!(target: "config", path = %path.display(), "Config file not found, no context menu types available");
            return Ok(ExtensionConfig::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::parse(&content)
    }

    /// Parse configuration text, keeping every well-formed entry.
    pub fn parse(content: &str) -> Result<ExtensionConfig> {
        let raw: RawConfig = serde_json::from_str(content).context("Failed to parse config file")?;
        let mut warnings = Vec::new();

        let log_file = match raw.log_file {
            Value::String(path) => Some(PathBuf::from(expand_env_vars(&path))),
            Value::Null => None,
            other => {
                warnings.push(ConfigWarning::LogFileNotString {
                    value: other.to_string(),
                });
                None
            }
        };

        let mut types = BTreeMap::new();
        match raw.types {
            Value::Object(entries) => {
                for (type_key, entry) in entries {
                    if !entry.is_object() {
                        warnings.push(ConfigWarning::EntryNotObject { type_key });
                        continue;
                    }
                    match serde_json::from_value::<MenuEntryConfig>(entry) {
                        Ok(entry) => {
                            types.insert(type_key, entry);
                        }
                        Err(e) => warnings.push(ConfigWarning::MalformedEntry {
                            type_key,
                            error: e.to_string(),
                        }),
                    }
                }
            }
            Value::Null => {}
            other => warnings.push(ConfigWarning::TypesNotObject {
                value: other.to_string(),
            }),
        }

        Ok(ExtensionConfig {
            log_file,
            types,
            warnings,
        })
    }

    /// Emits one warning per value skipped while parsing.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            tracing::warn!(target: "config", "{warning}");
        }
    }
}

/// Expands `%NAME%` references from the process environment.
pub fn expand_env_vars(input: &str) -> String {
    expand_env_vars_with(input, |name| std::env::var(name).ok())
}

/// Expands `%NAME%` references using `lookup`. Unknown names stay verbatim.
pub fn expand_env_vars_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut expanded = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('%') {
        expanded.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('%') else {
            expanded.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let name = &after[..end];
        match (!name.is_empty()).then(|| lookup(name)).flatten() {
            Some(value) => {
                expanded.push_str(&value);
                rest = &after[end + 1..];
            }
            None => {
                // The closing '%' may open the next reference.
                expanded.push('%');
                expanded.push_str(name);
                rest = &after[end..];
            }
        }
    }

    expanded.push_str(rest);
    expanded
}
