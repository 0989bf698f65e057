//! Configuration loading and discovery.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::io::{file_readable, paths_upwards, read_file};
use crate::typeguard::{is_array_of, is_string};
use crate::{AlchemyError, ReportSink, ReportSource};

/// File names searched for during configuration discovery.
pub const CONFIG_FILENAMES: &[&str] = &[".alchemyrc.json"];

/// Configuration for a single run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Configuration {
    /// Directory containing the configuration file.
    pub base_dir: Option<PathBuf>,
    /// Reports to read.
    pub sources: Vec<ReportSource>,
    /// Reports to write.
    pub sinks: Vec<ReportSink>,
    /// Additional plugin specifiers, in load order.
    pub plugins: Vec<String>,
}

impl Configuration {
    /// Loads configuration from a file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, AlchemyError> {
        let path = path.as_ref();
        let data = read_file(path)
            .await
            .map_err(|_| AlchemyError::config("Could not read configuration file"))?;

        let text = String::from_utf8_lossy(&data);
        let mut config = Self::from_json(&text)?;
        config.base_dir = path.parent().map(Path::to_path_buf);

        Ok(config)
    }

    /// Parses and validates configuration from a JSON string.
    ///
    /// `sources` and `sinks` must be arrays of `{type, filename}` objects.
    /// A `plugins` entry that is not an array of strings is ignored.
    pub fn from_json(json: &str) -> Result<Self, AlchemyError> {
        let value: Value = serde_json::from_str(json)?;

        let Value::Object(user_config) = value else {
            return Err(AlchemyError::config("Configuration JSON is not an object"));
        };

        let sources = user_config.get("sources");
        if !is_array_of(sources, ReportSource::is_valid) {
            return Err(AlchemyError::config(
                "Invalid report `sources` configuration",
            ));
        }

        let sinks = user_config.get("sinks");
        if !is_array_of(sinks, ReportSink::is_valid) {
            return Err(AlchemyError::config("Invalid report `sinks` configuration"));
        }

        let plugins = user_config.get("plugins");
        let plugins = if is_array_of(plugins, is_string) {
            deserialize(plugins)?
        } else {
            if plugins.is_some() {
                warn!("Ignoring `plugins` configuration that is not a list of names");
            }
            Vec::new()
        };

        Ok(Self {
            base_dir: None,
            sources: deserialize(sources)?,
            sinks: deserialize(sinks)?,
            plugins,
        })
    }

    /// Finds the nearest configuration file, starting at `start_dir` and
    /// walking up to the root of the file system.
    pub async fn discover(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
        for dir in paths_upwards(start_dir) {
            for name in CONFIG_FILENAMES {
                let candidate = dir.join(name);
                debug!("Checking for config at {}", candidate.display());

                if file_readable(&candidate).await {
                    return Some(candidate);
                }
            }
        }

        None
    }
}

fn deserialize<T: serde::de::DeserializeOwned>(
    value: Option<&Value>,
) -> Result<Vec<T>, AlchemyError> {
    match value {
        Some(value) => Ok(serde_json::from_value(value.clone())?),
        None => Ok(Vec::new()),
    }
}

/// Loads the configuration for a run.
///
/// An explicit path is used as is. Otherwise the configuration is
/// discovered from `start_dir` upwards.
pub async fn load_configuration(
    explicit: Option<&Path>,
    start_dir: &Path,
) -> Result<Configuration, AlchemyError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => Configuration::discover(start_dir)
            .await
            .ok_or_else(|| AlchemyError::config("No configuration file found!"))?,
    };

    info!("Using config: {}", path.display());
    Configuration::from_file(&path).await
}
