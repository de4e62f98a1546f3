use thiserror::Error;

use crate::services::credential_service::CatalogProvider;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 目录 API 调用错误
    #[error("目录API错误: {0}")]
    Catalog(#[from] CatalogError),
    /// 授权错误
    #[error("授权错误: {0}")]
    Auth(#[from] AuthError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 目录 API 调用错误
///
/// `Http` 与 `Request` 属于传输层/HTTP 层失败，其余属于通用/意外失败。
#[derive(Debug, Error)]
pub enum CatalogError {
    /// API 返回非 2xx 状态码
    #[error("HTTP错误 ({endpoint}): status={status}, body={body}")]
    Http {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 网络请求失败（连接、超时等）
    #[error("请求失败 ({endpoint}): {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// JSON 解析失败
    #[error("响应解析失败 ({endpoint}): {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// 响应缺少必要字段
    #[error("响应缺少字段 ({endpoint}): {field}")]
    MissingField {
        endpoint: String,
        field: &'static str,
    },
    /// 单次写入超过 API 上限
    #[error("批次过大: {size} 条，上限 {max} 条")]
    BatchTooLarge { size: usize, max: usize },
}

impl CatalogError {
    /// 是否为传输层/HTTP 层失败
    pub fn is_transport(&self) -> bool {
        matches!(self, CatalogError::Http { .. } | CatalogError::Request { .. })
    }

    /// HTTP 状态码（仅 `Http` 变体）
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 授权错误
#[derive(Debug, Error)]
pub enum AuthError {
    /// 调用方未登录
    #[error("用户未认证: {principal}")]
    NotAuthenticated { principal: String },
    /// 从未关联该平台账号
    #[error("未关联 {provider} 账号")]
    NotLinked { provider: CatalogProvider },
    /// 已关联但需要重新授权
    #[error("{provider} 授权已失效，请重新登录 {provider}")]
    ReauthorizationRequired { provider: CatalogProvider },
    /// 不支持的平台名称
    #[error("不支持的平台: {0}")]
    UnsupportedProvider(String),
}

/// 转移流程错误（导致状态机进入 `Failed`）
#[derive(Debug, Error)]
pub enum TransferError {
    /// 源播放列表不存在或标题缺失
    #[error("源播放列表不存在或无有效标题: {playlist_id}")]
    SourceNotFound { playlist_id: String },
    /// 获取源播放列表详情失败
    #[error("获取源播放列表详情失败: {0}")]
    SourceMetadata(#[source] CatalogError),
    /// 获取源播放列表条目失败
    #[error("获取源播放列表条目失败: {0}")]
    SourceItems(#[source] CatalogError),
    /// 无法获取目标平台用户
    #[error("无法获取目标平台用户ID: {0}")]
    TargetIdentity(#[source] CatalogError),
    /// 创建目标播放列表失败
    #[error("创建目标播放列表失败: {0}")]
    TargetCreate(#[source] CatalogError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// HTTP 客户端构建失败
    #[error("HTTP客户端构建失败: {0}")]
    HttpClientBuildFailed(#[source] reqwest::Error),
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
