use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 源目录（YouTube Data API）基础 URL
    pub source_api_base_url: String,
    /// 目标目录（Spotify Web API）基础 URL
    pub target_api_base_url: String,
    /// 源平台访问令牌
    pub source_access_token: Option<String>,
    /// 目标平台访问令牌
    pub target_access_token: Option<String>,
    /// 持有上述令牌的本地用户
    pub principal: String,
    /// 同时进行的转移任务数量
    pub max_concurrent_transfers: usize,
    /// 新建的目标播放列表是否公开
    pub target_playlist_public: bool,
    /// 匹配接受阈值，`None` 表示无条件接受第一条搜索结果
    pub match_threshold: Option<f64>,
    /// 单个 HTTP 请求超时（秒），`None` 表示不设超时
    pub request_timeout_secs: Option<u64>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_api_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            target_api_base_url: "https://api.spotify.com/v1".to_string(),
            source_access_token: None,
            target_access_token: None,
            principal: "local".to_string(),
            max_concurrent_transfers: 5,
            target_playlist_public: false,
            match_threshold: None,
            request_timeout_secs: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 加载配置：先读取 TOML 文件（如果提供），再应用环境变量覆盖
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => return Ok(Self::from_env()),
        };
        Ok(base.with_env_overrides())
    }

    /// 从 TOML 文件读取配置，缺失的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn with_env_overrides(self) -> Self {
        let base = self;
        Self {
            source_api_base_url: std::env::var("SOURCE_API_BASE_URL").unwrap_or(base.source_api_base_url),
            target_api_base_url: std::env::var("TARGET_API_BASE_URL").unwrap_or(base.target_api_base_url),
            source_access_token: std::env::var("SOURCE_ACCESS_TOKEN").ok().or(base.source_access_token),
            target_access_token: std::env::var("TARGET_ACCESS_TOKEN").ok().or(base.target_access_token),
            principal: std::env::var("TRANSFER_PRINCIPAL").unwrap_or(base.principal),
            max_concurrent_transfers: std::env::var("MAX_CONCURRENT_TRANSFERS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.max_concurrent_transfers),
            target_playlist_public: std::env::var("TARGET_PLAYLIST_PUBLIC").ok().and_then(|v| v.parse().ok()).unwrap_or(base.target_playlist_public),
            match_threshold: std::env::var("MATCH_THRESHOLD").ok().and_then(|v| v.parse().ok()).or(base.match_threshold),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).or(base.request_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(base.verbose_logging),
        }
    }
}
