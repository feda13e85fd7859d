// src/config/config_manager.rs

use serde::{Deserialize, Serialize};

use crate::adapter::{BANNER_ENDPOINT, VIDEO_ENDPOINT};

/// 适配器全局配置（对应 host 侧的全局配置存储）
///
/// 在一次竞价周期内只读，由 [`crate::adapter::SaambaaAdapter`] 持有。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AdapterConfig {
    /// 是否开启 COPPA（儿童隐私保护）
    pub coppa: bool,
    /// 覆盖 referer 的页面地址
    pub page_url: Option<String>,
    /// 视频请求的 endpoint 前缀，后面直接拼接 pubid
    pub video_endpoint: String,
    /// Banner 请求的 endpoint 前缀
    pub banner_endpoint: String,
    /// 传输层超时（毫秒）
    pub timeout_ms: u64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            coppa: false,
            page_url: None,
            video_endpoint: VIDEO_ENDPOINT.to_string(),
            banner_endpoint: BANNER_ENDPOINT.to_string(),
            timeout_ms: 3000,
        }
    }
}

impl AdapterConfig {
    /// 将两种格式的 endpoint 都指向同一个前缀（本地 mock 或测试环境）
    pub fn with_endpoint(mut self, base: &str) -> Self {
        self.video_endpoint = base.to_string();
        self.banner_endpoint = base.to_string();
        self
    }

    /// 命令行参数覆盖文件配置
    pub fn apply_overrides(
        mut self,
        coppa: bool,
        page_url: Option<String>,
        endpoint: Option<&str>,
    ) -> Self {
        if coppa {
            self.coppa = true;
        }
        if page_url.is_some() {
            self.page_url = page_url;
        }
        match endpoint {
            Some(base) => self.with_endpoint(base),
            None => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: AdapterConfig = serde_json::from_str(r#"{"coppa": true}"#).unwrap();
        assert!(config.coppa);
        assert_eq!(config.video_endpoint, VIDEO_ENDPOINT);
        assert_eq!(config.timeout_ms, 3000);
    }

    #[test]
    fn overrides_only_touch_given_fields() {
        let config = AdapterConfig {
            page_url: Some("https://from-file.example".into()),
            ..AdapterConfig::default()
        }
        .apply_overrides(false, None, Some("http://127.0.0.1:9001/xp/get?pubid="));

        assert!(!config.coppa);
        assert_eq!(config.page_url.as_deref(), Some("https://from-file.example"));
        assert_eq!(config.banner_endpoint, "http://127.0.0.1:9001/xp/get?pubid=");
        assert_eq!(config.video_endpoint, config.banner_endpoint);
    }
}
