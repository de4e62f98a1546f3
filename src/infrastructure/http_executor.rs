//! HTTP 执行器 - 基础设施层
//!
//! 持有唯一的连接池（reqwest::Client），只暴露"带令牌发送请求"的能力

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{CatalogError, ConfigError};
use crate::utils::logging::truncate_text;

/// HTTP 执行器
///
/// 职责：
/// - 持有 reqwest 连接池，clone 开销很小
/// - 为每个请求附加调用方传入的 Bearer 令牌
/// - 把非 2xx 响应转换为携带状态码和响应体的 `CatalogError::Http`
/// - 不认识播放列表 / 曲目
#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    /// 根据配置创建执行器
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(ConfigError::HttpClientBuildFailed)?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// 发送 GET 请求并反序列化 JSON 响应
    ///
    /// # 参数
    /// - `url`: 完整的请求地址（不含查询参数）
    /// - `query`: 查询参数，由 reqwest 负责编码
    /// - `token`: Bearer 令牌
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<T, CatalogError> {
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| CatalogError::Request {
                endpoint: url.to_string(),
                source,
            })?;

        Self::read_json(url, response).await
    }

    /// 发送 JSON 请求体的 POST 请求并反序列化 JSON 响应
    pub async fn post_json<B, T>(&self, url: &str, body: &B, token: &str) -> Result<T, CatalogError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|source| CatalogError::Request {
                endpoint: url.to_string(),
                source,
            })?;

        Self::read_json(url, response).await
    }

    async fn read_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, CatalogError> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| CatalogError::Request {
                endpoint: url.to_string(),
                source,
            })?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            warn!("⚠️ {} 返回 {}: {}", url, status.as_u16(), truncate_text(&body, 200));
            return Err(CatalogError::Http {
                endpoint: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_slice(&bytes).map_err(|source| CatalogError::Decode {
            endpoint: url.to_string(),
            source,
        })
    }
}
