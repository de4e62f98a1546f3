//! 凭证服务
//!
//! 为指定用户和平台提供访问令牌。令牌的获取与刷新不在本 crate 内完成，
//! 这里只区分"从未关联"和"需要重新授权"两种失败。

use std::fmt::Display;
use std::str::FromStr;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AuthError;

/// 平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogProvider {
    /// 源目录（Google 账号）
    Youtube,
    /// 目标目录
    Spotify,
}

impl CatalogProvider {
    pub fn name(self) -> &'static str {
        match self {
            CatalogProvider::Youtube => "youtube",
            CatalogProvider::Spotify => "spotify",
        }
    }
}

impl Display for CatalogProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CatalogProvider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "youtube" | "google" => Ok(CatalogProvider::Youtube),
            "spotify" => Ok(CatalogProvider::Spotify),
            other => Err(AuthError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// 凭证提供者
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn access_token(&self, principal: &str, provider: CatalogProvider) -> Result<String, AuthError>;
}

/// 从配置读取令牌的凭证提供者（单用户）
pub struct ConfigCredentialProvider {
    principal: String,
    source_token: Option<String>,
    target_token: Option<String>,
}

impl ConfigCredentialProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            principal: config.principal.clone(),
            source_token: config.source_access_token.clone(),
            target_token: config.target_access_token.clone(),
        }
    }
}

#[async_trait]
impl CredentialProvider for ConfigCredentialProvider {
    async fn access_token(&self, principal: &str, provider: CatalogProvider) -> Result<String, AuthError> {
        if principal != self.principal {
            warn!("⚠️ 未知用户: {}", principal);
            return Err(AuthError::NotAuthenticated {
                principal: principal.to_string(),
            });
        }

        let token = match provider {
            CatalogProvider::Youtube => self.source_token.as_deref(),
            CatalogProvider::Spotify => self.target_token.as_deref(),
        };

        match token {
            None => {
                warn!("⚠️ 用户 {} 尚未关联 {} 账号", principal, provider);
                Err(AuthError::NotLinked { provider })
            }
            Some(token) if token.trim().is_empty() => {
                warn!("⚠️ 用户 {} 的 {} 令牌为空，需要重新授权", principal, provider);
                Err(AuthError::ReauthorizationRequired { provider })
            }
            Some(token) => {
                debug!("获取到 {} 令牌 (用户 {})", provider, principal);
                Ok(token.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(source: Option<&str>, target: Option<&str>) -> ConfigCredentialProvider {
        let config = Config {
            principal: "alice".to_string(),
            source_access_token: source.map(str::to_string),
            target_access_token: target.map(str::to_string),
            ..Config::default()
        };
        ConfigCredentialProvider::new(&config)
    }

    #[test]
    fn test_provider_names_parse() {
        assert_eq!("Google".parse::<CatalogProvider>().unwrap(), CatalogProvider::Youtube);
        assert_eq!("youtube".parse::<CatalogProvider>().unwrap(), CatalogProvider::Youtube);
        assert_eq!("SPOTIFY".parse::<CatalogProvider>().unwrap(), CatalogProvider::Spotify);
        assert!(matches!(
            "deezer".parse::<CatalogProvider>(),
            Err(AuthError::UnsupportedProvider(name)) if name == "deezer"
        ));
    }

    #[tokio::test]
    async fn test_tokens_are_served_per_provider() {
        let p = provider(Some("yt-token"), Some("sp-token"));
        assert_eq!(p.access_token("alice", CatalogProvider::Youtube).await.unwrap(), "yt-token");
        assert_eq!(p.access_token("alice", CatalogProvider::Spotify).await.unwrap(), "sp-token");
    }

    #[tokio::test]
    async fn test_missing_and_blank_tokens_are_distinguished() {
        let p = provider(None, Some("  "));
        assert!(matches!(
            p.access_token("alice", CatalogProvider::Youtube).await,
            Err(AuthError::NotLinked { provider: CatalogProvider::Youtube })
        ));
        assert!(matches!(
            p.access_token("alice", CatalogProvider::Spotify).await,
            Err(AuthError::ReauthorizationRequired { provider: CatalogProvider::Spotify })
        ));
    }

    #[tokio::test]
    async fn test_unknown_principal_is_rejected() {
        let p = provider(Some("a"), Some("b"));
        assert!(matches!(
            p.access_token("mallory", CatalogProvider::Spotify).await,
            Err(AuthError::NotAuthenticated { .. })
        ));
    }
}
