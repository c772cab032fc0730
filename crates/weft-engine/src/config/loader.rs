use super::schema::CompilerConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./weft.yaml
    /// 2. ~/.weft/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<CompilerConfig, ConfigError> {
        let local_config = PathBuf::from("./weft.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".weft").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(CompilerConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<CompilerConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: CompilerConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Strategy;

    #[tokio::test]
    async fn load_from_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weft.yaml");
        tokio::fs::write(
            &path,
            "strategy: model_assisted\nanalyzer:\n  endpoint: http://localhost:9900/analyze\n",
        )
        .await
        .unwrap();

        let config = ConfigLoader::load_from(&path).await.unwrap();
        assert_eq!(config.strategy, Strategy::ModelAssisted);
        assert_eq!(
            config.analyzer.endpoint.as_deref(),
            Some("http://localhost:9900/analyze")
        );
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let result = ConfigLoader::load_from(Path::new("/nonexistent/weft.yaml")).await;
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
