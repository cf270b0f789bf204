use std::path::PathBuf;

use crate::generator::LlmConfig;

const DEFAULT_DATA_DIR: &str = ".hanpath";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub llm: LlmConfig,
}

impl Config {
    /// Reads the environment, after loading `.env` if one exists.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let data_dir = std::env::var("HANPATH_DATA_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            data_dir: PathBuf::from(data_dir),
            log_level,
            llm: LlmConfig::from_env(),
        }
    }
}
