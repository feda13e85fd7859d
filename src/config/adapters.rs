// src/config/adapters.rs

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::config_manager::AdapterConfig;
use crate::error::{AdapterError, AdapterResult};

pub trait ConfigSource: Send + Sync {
    fn adapter_config(&self) -> AdapterConfig;
}

/// 从 JSON 文件读取配置，文件缺失或解析失败时回退到默认值
pub struct FileConfigSource {
    pub config_file: PathBuf,
}

impl FileConfigSource {
    pub fn new(config_file: impl AsRef<Path>) -> Self {
        Self {
            config_file: config_file.as_ref().to_path_buf(),
        }
    }
}

impl ConfigSource for FileConfigSource {
    fn adapter_config(&self) -> AdapterConfig {
        match load_json::<AdapterConfig>(&self.config_file) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %self.config_file.display(), error = %e, "falling back to default adapter config");
                AdapterConfig::default()
            }
        }
    }
}

/// 读取并解析一个 JSON 文件（descriptor、context、environment 都走这里）
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> AdapterResult<T> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| AdapterError::Config(format!("unable to read {}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_default() {
        let source = FileConfigSource::new("/nonexistent/saambaa.json");
        assert_eq!(source.adapter_config(), AdapterConfig::default());
    }

    #[test]
    fn reads_config_from_file() {
        let path = std::env::temp_dir().join(format!("saambaa-config-{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{"coppa": true, "pageUrl": "https://news.example/a"}}"#).unwrap();

        let config = FileConfigSource::new(&path).adapter_config();
        fs::remove_file(&path).ok();

        assert!(config.coppa);
        assert_eq!(config.page_url.as_deref(), Some("https://news.example/a"));
    }

    #[test]
    fn load_json_reports_unreadable_file() {
        let err = load_json::<AdapterConfig>("/nonexistent/saambaa.json").unwrap_err();
        assert!(matches!(err, AdapterError::Config(_)));
    }
}
