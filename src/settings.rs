use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "stadium_flow.toml";
const ENV_PREFIX: &str = "STADIUM";

const PAGE_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_association_football_stadiums_by_capacity";
const BASE_URL: &str = "https://en.wikipedia.org/";
const PLACEHOLDER_IMAGE: &str = "https://en.m.wikipedia.org/wiki/File:No_image_available.svg";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Article holding the stadium table.
    pub page_url: String,
    /// Origin relative image links are resolved against.
    pub base_url: String,
    /// Substituted for records whose image link is missing.
    pub placeholder_image: String,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub query_path: PathBuf,
    pub batch_size: usize,
    pub fetch_timeout_secs: u64,
}

impl Settings {
    /// [`Settings::default`], then the config file (if present), then `STADIUM_*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let defaults = Config::try_from(&Settings::default())
            .context("Failed to seed default settings")?;

        let settings = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name(&file).required(path.is_some()))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("Failed to load settings from {}", file))?;

        settings
            .try_deserialize()
            .context("Invalid stadium_flow settings")
    }

    pub fn output_csv(&self) -> PathBuf {
        self.data_dir.join("output.csv")
    }

    pub fn query_results_csv(&self) -> PathBuf {
        self.data_dir.join("query_results.csv")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            page_url: PAGE_URL.to_string(),
            base_url: BASE_URL.to_string(),
            placeholder_image: PLACEHOLDER_IMAGE.to_string(),
            data_dir: PathBuf::from("data"),
            db_path: PathBuf::from("data/stadiums.sqlite"),
            query_path: PathBuf::from("sql/stadium_queries.sql"),
            batch_size: 1000,
            fetch_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "data_dir = \"out\"\nbatch_size = 50\n").unwrap();

        let s = Settings::load(Some(path.as_path())).unwrap();
        assert_eq!(s.data_dir, PathBuf::from("out"));
        assert_eq!(s.batch_size, 50);
        assert_eq!(s.base_url, BASE_URL);
        assert_eq!(s.output_csv(), PathBuf::from("out/output.csv"));
    }

    #[test]
    fn defaults_come_from_one_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();

        let loaded = Settings::load(Some(path.as_path())).unwrap();
        let defaults = Settings::default();
        assert_eq!(loaded.page_url, defaults.page_url);
        assert_eq!(loaded.placeholder_image, defaults.placeholder_image);
        assert_eq!(loaded.db_path, defaults.db_path);
        assert_eq!(loaded.query_path, defaults.query_path);
        assert_eq!(loaded.batch_size, defaults.batch_size);
        assert_eq!(loaded.fetch_timeout_secs, defaults.fetch_timeout_secs);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(dir.path().join("nope.toml").as_path())).is_err());
    }
}
