use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::app::{DEFAULT_DELAY, RunOptions};
use crate::domain::ExperimentalMethod;
use crate::error::FetchError;
use crate::output::DEFAULT_OUTPUT;
use crate::rcsb::{DEFAULT_TIMEOUT, Endpoints};
use crate::search::DEFAULT_PAGE_SIZE;

pub const DEFAULT_CONFIG_FILE: &str = "pdb-summary.json";
pub const DEFAULT_TARGET_COUNT: usize = 1000;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub target_count: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub methods: Option<Vec<String>>,
    #[serde(default)]
    pub endpoints: Option<EndpointOverrides>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EndpointOverrides {
    #[serde(default)]
    pub search_url: Option<String>,
    #[serde(default)]
    pub graphql_url: Option<String>,
    #[serde(default)]
    pub data_url: Option<String>,
}

/// Command-line values; each one wins over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub target_count: Option<usize>,
    pub page_size: Option<usize>,
    pub delay_ms: Option<u64>,
    pub output: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub target_count: usize,
    pub page_size: usize,
    pub delay: Duration,
    pub timeout: Duration,
    pub output: Utf8PathBuf,
    pub methods: Vec<ExperimentalMethod>,
    pub endpoints: Endpoints,
}

impl ResolvedConfig {
    pub fn apply(mut self, overrides: ConfigOverrides) -> Result<Self, FetchError> {
        if let Some(count) = overrides.target_count {
            self.target_count = count;
        }
        if let Some(page_size) = overrides.page_size {
            self.page_size = validate_page_size(page_size)?;
        }
        if let Some(delay_ms) = overrides.delay_ms {
            self.delay = Duration::from_millis(delay_ms);
        }
        if let Some(output) = overrides.output {
            self.output = Utf8PathBuf::from(output);
        }
        Ok(self)
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            page_size: self.page_size,
            delay: self.delay,
            methods: self.methods.clone(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `pdb-summary.json` in the working directory when present.
    /// Without either, built-in defaults apply.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, FetchError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| FetchError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| FetchError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, FetchError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let methods = match config.methods {
            Some(methods) if !methods.is_empty() => methods
                .iter()
                .map(|method| method.parse())
                .collect::<Result<Vec<ExperimentalMethod>, FetchError>>()?,
            _ => ExperimentalMethod::ALL.to_vec(),
        };

        let defaults = Endpoints::default();
        let endpoints = match config.endpoints {
            Some(overrides) => Endpoints {
                search_url: overrides.search_url.unwrap_or(defaults.search_url),
                graphql_url: overrides.graphql_url.unwrap_or(defaults.graphql_url),
                data_url: overrides.data_url.unwrap_or(defaults.data_url),
            },
            None => defaults,
        };

        Ok(ResolvedConfig {
            schema_version,
            target_count: config.target_count.unwrap_or(DEFAULT_TARGET_COUNT),
            page_size: validate_page_size(config.page_size.unwrap_or(DEFAULT_PAGE_SIZE))?,
            delay: config
                .delay_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_DELAY),
            timeout: config
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            output: Utf8PathBuf::from(config.output.as_deref().unwrap_or(DEFAULT_OUTPUT)),
            methods,
            endpoints,
        })
    }
}

fn validate_page_size(page_size: usize) -> Result<usize, FetchError> {
    if page_size == 0 {
        return Err(FetchError::InvalidPageSize(page_size));
    }
    Ok(page_size)
}
