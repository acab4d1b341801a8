use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

pub const DEFAULT_CONCURRENCY: usize = 10;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub crawler: CrawlerSettings,
    #[serde(default)]
    pub input: InputSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CrawlerSettings {
    pub search_url: String,
    #[serde(
        default = "default_concurrency",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub concurrency: usize,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    pub user_agent: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct InputSettings {
    pub game_list_path: Option<PathBuf>,
    #[serde(default)]
    pub queries: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputSettings {
    pub directory: PathBuf,
    #[serde(default)]
    pub format: TableFormat,
}

/// What the batch runner does when a single fetch fails.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure on that item's outcome and keep going.
    #[default]
    Isolate,
    /// Abort the whole batch on the first failure in submission order.
    FailFast,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Csv,
    Tsv,
}

impl TableFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Tsv => "tsv",
        }
    }

    pub fn separator(&self) -> char {
        match self {
            TableFormat::Csv => ',',
            TableFormat::Tsv => '\t',
        }
    }
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| ConfigError::Foreign(Box::new(e)))?;
    let configuration_directory = base_path.join("configuration");

    let settings = Config::builder()
        .add_source(File::from(configuration_directory.join("base.yaml")))
        .add_source(File::from(configuration_directory.join("local.yaml")).required(false))
        // E.g. `APP_CRAWLER__CONCURRENCY=4` sets `Settings.crawler.concurrency`
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// Parses settings from an in-memory yaml document, skipping the environment.
pub fn configuration_from_yaml(yaml: &str) -> Result<Settings, ConfigError> {
    Config::builder()
        .add_source(File::from_str(yaml, FileFormat::Yaml))
        .build()?
        .try_deserialize::<Settings>()
}
