/// Spotify Web API 客户端（目标目录）
///
/// 封装搜索、当前用户、新建播放列表、写入曲目四个调用
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clients::{TargetCatalog, TARGET_MAX_BATCH_SIZE};
use crate::config::Config;
use crate::error::CatalogError;
use crate::infrastructure::HttpExecutor;
use crate::models::{TargetCollection, TargetSearchCandidate, TargetUser};

#[derive(Debug, Deserialize)]
struct UserDto {
    id: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreatePlaylistRequest<'a> {
    name: &'a str,
    description: &'a str,
    public: bool,
    collaborative: bool,
}

#[derive(Debug, Deserialize)]
struct PlaylistDto {
    id: Option<String>,
    name: Option<String>,
    public: Option<bool>,
    owner: Option<UserDto>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<TrackDto>,
}

#[derive(Debug, Deserialize)]
struct TrackDto {
    id: Option<String>,
    name: Option<String>,
    artists: Option<Vec<ArtistDto>>,
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistDto {
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct AddTracksRequest<'a> {
    uris: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    snapshot_id: Option<String>,
}

impl From<TrackDto> for TargetSearchCandidate {
    fn from(track: TrackDto) -> Self {
        Self {
            id: track.id.unwrap_or_default(),
            title: track.name.unwrap_or_default(),
            artists: track
                .artists
                .unwrap_or_default()
                .into_iter()
                .filter_map(|a| a.name)
                .collect(),
            uri: track.uri.unwrap_or_default(),
        }
    }
}

/// Spotify 客户端
#[derive(Clone)]
pub struct SpotifyClient {
    executor: HttpExecutor,
    base_url: String,
}

impl SpotifyClient {
    pub fn new(executor: HttpExecutor, base_url: impl Into<String>) -> Self {
        Self {
            executor,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(executor: HttpExecutor, config: &Config) -> Self {
        Self::new(executor, config.target_api_base_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl TargetCatalog for SpotifyClient {
    async fn resolve_current_identity(&self, token: &str) -> Result<TargetUser, CatalogError> {
        info!("获取当前 Spotify 用户ID...");
        let url = self.url("me");
        let user: UserDto = self
            .executor
            .get_json(&url, &[("fields", "id".to_string())], token)
            .await?;

        let id = user
            .id
            .filter(|id| !id.is_empty())
            .ok_or(CatalogError::MissingField { endpoint: url, field: "id" })?;
        debug!("Spotify 用户ID: {}", id);
        Ok(TargetUser { id })
    }

    async fn create_collection(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
        is_public: bool,
        token: &str,
    ) -> Result<TargetCollection, CatalogError> {
        info!("为用户 {} 创建 Spotify 播放列表 '{}'", owner_id, name);
        let url = self.url(&format!("users/{}/playlists", owner_id));
        let body = CreatePlaylistRequest {
            name,
            description,
            public: is_public,
            collaborative: false,
        };

        let created: PlaylistDto = self.executor.post_json(&url, &body, token).await?;

        let id = created
            .id
            .filter(|id| !id.is_empty())
            .ok_or(CatalogError::MissingField { endpoint: url, field: "id" })?;

        Ok(TargetCollection {
            id,
            name: created.name.unwrap_or_else(|| name.to_string()),
            owner_id: created
                .owner
                .and_then(|o| o.id)
                .unwrap_or_else(|| owner_id.to_string()),
            is_public: created.public.unwrap_or(is_public),
        })
    }

    async fn search(&self, query: &str, token: &str) -> Result<Option<TargetSearchCandidate>, CatalogError> {
        debug!("Spotify 搜索: '{}'", query);
        let params = [
            ("q", query.to_string()),
            ("type", "track".to_string()),
            ("limit", "1".to_string()),
        ];
        let response: SearchResponse = self
            .executor
            .get_json(&self.url("search"), &params, token)
            .await?;

        let candidate = response
            .tracks
            .and_then(|page| page.items.into_iter().next())
            .map(TargetSearchCandidate::from);

        match &candidate {
            Some(track) => debug!("搜索结果: ID={}, 名称='{}'", track.id, track.title),
            None => debug!("搜索无结果: '{}'", query),
        }
        Ok(candidate)
    }

    async fn append_items(
        &self,
        collection_id: &str,
        uris: &[String],
        token: &str,
    ) -> Result<Option<String>, CatalogError> {
        if uris.is_empty() {
            warn!("⚠️ 没有需要写入播放列表 {} 的曲目", collection_id);
            return Ok(None);
        }
        if uris.len() > TARGET_MAX_BATCH_SIZE {
            return Err(CatalogError::BatchTooLarge {
                size: uris.len(),
                max: TARGET_MAX_BATCH_SIZE,
            });
        }

        let url = self.url(&format!("playlists/{}/tracks", collection_id));
        let response: SnapshotResponse = self
            .executor
            .post_json(&url, &AddTracksRequest { uris }, token)
            .await?;

        debug!(
            "写入 {} 首曲目到播放列表 {}，snapshot_id: {:?}",
            uris.len(),
            collection_id,
            response.snapshot_id
        );
        Ok(response.snapshot_id)
    }
}
