/// YouTube Data API 客户端（源目录）
///
/// 只请求必要字段（`fields` 参数），令牌由调用方逐次传入
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::clients::pagination::{fetch_all_pages, Page};
use crate::clients::SourceCatalog;
use crate::config::Config;
use crate::error::CatalogError;
use crate::infrastructure::HttpExecutor;
use crate::models::{SourceItem, SourcePlaylistSummary};

/// 每页条目数（YouTube 允许的最大值）
const PAGE_SIZE: u32 = 50;

const PLAYLIST_DETAILS_FIELDS: &str = "items(id,snippet(title))";
const PLAYLIST_ITEMS_FIELDS: &str =
    "nextPageToken,items(id,snippet(title,resourceId(videoId),videoOwnerChannelTitle))";
const MY_PLAYLISTS_FIELDS: &str = "nextPageToken,items(id,snippet(title),contentDetails(itemCount))";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistListResponse {
    next_page_token: Option<String>,
    items: Option<Vec<PlaylistDto>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistDto {
    id: Option<String>,
    snippet: Option<TitleSnippet>,
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
struct TitleSnippet {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    item_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemListResponse {
    next_page_token: Option<String>,
    items: Option<Vec<PlaylistItemDto>>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemDto {
    snippet: Option<PlaylistItemSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    title: Option<String>,
    video_owner_channel_title: Option<String>,
    resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

impl PlaylistItemDto {
    /// 缺少视频ID的条目（已删除/私有视频）返回 `None`
    fn into_source_item(self) -> Option<SourceItem> {
        let snippet = self.snippet?;
        let video_id = snippet.resource_id?.video_id.filter(|id| !id.is_empty())?;
        Some(SourceItem {
            id: video_id,
            title: snippet.title.unwrap_or_default(),
            channel: snippet.video_owner_channel_title.unwrap_or_default(),
        })
    }
}

/// YouTube 客户端
#[derive(Clone)]
pub struct YoutubeClient {
    executor: HttpExecutor,
    base_url: String,
}

impl YoutubeClient {
    pub fn new(executor: HttpExecutor, base_url: impl Into<String>) -> Self {
        Self {
            executor,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(executor: HttpExecutor, config: &Config) -> Self {
        Self::new(executor, config.source_api_base_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn fetch_items_page(
        &self,
        collection_id: &str,
        page_token: Option<String>,
        token: &str,
    ) -> Result<Page<SourceItem>, CatalogError> {
        let mut query = vec![
            ("part", "snippet".to_string()),
            ("playlistId", collection_id.to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
            ("fields", PLAYLIST_ITEMS_FIELDS.to_string()),
        ];
        if let Some(page_token) = page_token {
            query.push(("pageToken", page_token));
        }

        let page: PlaylistItemListResponse = self
            .executor
            .get_json(&self.url("playlistItems"), &query, token)
            .await?;

        let Some(raw_items) = page.items else {
            warn!("⚠️ playlistItems 返回的页面没有 items 字段，停止翻页");
            return Ok(Page { items: Vec::new(), next_token: None });
        };

        let raw_count = raw_items.len();
        let items: Vec<SourceItem> = raw_items
            .into_iter()
            .filter_map(PlaylistItemDto::into_source_item)
            .collect();
        if items.len() < raw_count {
            debug!("丢弃 {} 个缺少视频ID的条目", raw_count - items.len());
        }

        Ok(Page {
            items,
            next_token: page.next_page_token,
        })
    }

    async fn fetch_my_playlists_page(
        &self,
        page_token: Option<String>,
        token: &str,
    ) -> Result<Page<SourcePlaylistSummary>, CatalogError> {
        let mut query = vec![
            ("part", "snippet,contentDetails".to_string()),
            ("mine", "true".to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
            ("fields", MY_PLAYLISTS_FIELDS.to_string()),
        ];
        if let Some(page_token) = page_token {
            query.push(("pageToken", page_token));
        }

        let page: PlaylistListResponse = self
            .executor
            .get_json(&self.url("playlists"), &query, token)
            .await?;

        let Some(raw_items) = page.items else {
            warn!("⚠️ playlists 返回的页面没有 items 字段，停止翻页");
            return Ok(Page { items: Vec::new(), next_token: None });
        };

        let items = raw_items
            .into_iter()
            .filter_map(|p| {
                Some(SourcePlaylistSummary {
                    id: p.id?,
                    title: p.snippet.and_then(|s| s.title).unwrap_or_default(),
                    item_count: p.content_details.and_then(|c| c.item_count),
                })
            })
            .collect();

        Ok(Page {
            items,
            next_token: page.next_page_token,
        })
    }
}

#[async_trait]
impl SourceCatalog for YoutubeClient {
    async fn fetch_collection_title(
        &self,
        collection_id: &str,
        token: &str,
    ) -> Result<Option<String>, CatalogError> {
        info!("获取 YouTube 播放列表详情: {}", collection_id);

        let query = [
            ("part", "snippet".to_string()),
            ("id", collection_id.to_string()),
            ("maxResults", "1".to_string()),
            ("fields", PLAYLIST_DETAILS_FIELDS.to_string()),
        ];
        let response: PlaylistListResponse = self
            .executor
            .get_json(&self.url("playlists"), &query, token)
            .await?;

        let title = response
            .items
            .and_then(|items| items.into_iter().next())
            .and_then(|p| p.snippet)
            .and_then(|s| s.title)
            .filter(|t| !t.trim().is_empty());

        if title.is_none() {
            warn!("⚠️ 未找到播放列表 {} 或其标题为空", collection_id);
        }
        Ok(title)
    }

    async fn fetch_all_items(
        &self,
        collection_id: &str,
        token: &str,
    ) -> Result<Vec<SourceItem>, CatalogError> {
        info!("获取 YouTube 播放列表条目: {}", collection_id);

        let items = fetch_all_pages(|page_token| self.fetch_items_page(collection_id, page_token, token)).await?;

        info!("✓ 播放列表 {} 共获取 {} 个有效条目", collection_id, items.len());
        Ok(items)
    }

    async fn list_my_collections(&self, token: &str) -> Result<Vec<SourcePlaylistSummary>, CatalogError> {
        info!("获取当前用户的 YouTube 播放列表...");

        let playlists = fetch_all_pages(|page_token| self.fetch_my_playlists_page(page_token, token)).await?;

        info!("✓ 共获取 {} 个播放列表", playlists.len());
        Ok(playlists)
    }
}
