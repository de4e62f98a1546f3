//! 目录 API 客户端
//!
//! 源目录（YouTube）与目标目录（Spotify）各自实现一个 trait，
//! 流程层只依赖 trait，便于并发共享（`Arc<dyn ...>`）和测试替换。

pub mod pagination;
pub mod spotify_client;
pub mod youtube_client;

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::models::{SourceCollection, SourceItem, SourcePlaylistSummary, TargetCollection, TargetSearchCandidate, TargetUser};

pub use spotify_client::SpotifyClient;
pub use youtube_client::YoutubeClient;

/// 目标 API 单次写入的曲目上限
pub const TARGET_MAX_BATCH_SIZE: usize = 100;

/// 源目录只读能力
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    /// 获取播放列表标题；不存在或标题缺失时返回 `Ok(None)`
    async fn fetch_collection_title(
        &self,
        collection_id: &str,
        token: &str,
    ) -> Result<Option<String>, CatalogError>;

    /// 按顺序获取播放列表的全部条目（自动翻页）
    async fn fetch_all_items(
        &self,
        collection_id: &str,
        token: &str,
    ) -> Result<Vec<SourceItem>, CatalogError>;

    /// 列出当前用户拥有的播放列表
    async fn list_my_collections(&self, token: &str) -> Result<Vec<SourcePlaylistSummary>, CatalogError>;

    /// 标题 + 全部条目；播放列表不存在时返回 `Ok(None)`，不再请求条目
    async fn fetch_collection(
        &self,
        collection_id: &str,
        token: &str,
    ) -> Result<Option<SourceCollection>, CatalogError> {
        let Some(title) = self.fetch_collection_title(collection_id, token).await? else {
            return Ok(None);
        };
        let items = self.fetch_all_items(collection_id, token).await?;
        Ok(Some(SourceCollection {
            id: collection_id.to_string(),
            title,
            items,
        }))
    }
}

/// 目标目录读写能力
#[async_trait]
pub trait TargetCatalog: Send + Sync {
    async fn resolve_current_identity(&self, token: &str) -> Result<TargetUser, CatalogError>;

    async fn create_collection(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
        is_public: bool,
        token: &str,
    ) -> Result<TargetCollection, CatalogError>;

    /// 只请求排名第一的结果，是否算作匹配由调用方决定
    async fn search(&self, query: &str, token: &str) -> Result<Option<TargetSearchCandidate>, CatalogError>;

    /// 写入一个批次，调用方负责保证批次不超过 [`TARGET_MAX_BATCH_SIZE`]
    ///
    /// 返回目标平台的确认令牌（如 snapshot_id）
    async fn append_items(
        &self,
        collection_id: &str,
        uris: &[String],
        token: &str,
    ) -> Result<Option<String>, CatalogError>;
}
