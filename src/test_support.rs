//! 单元测试用的内存目录

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::clients::{SourceCatalog, TargetCatalog};
use crate::error::CatalogError;
use crate::models::{SourceItem, SourcePlaylistSummary, TargetCollection, TargetSearchCandidate, TargetUser};

pub fn http_error(endpoint: &str, status: u16) -> CatalogError {
    CatalogError::Http {
        endpoint: endpoint.to_string(),
        status,
        body: format!("{{\"error\":{{\"status\":{}}}}}", status),
    }
}

/// `count` 个条目，标题为 "Song 1".."Song N"，频道为 "Artist"
pub fn numbered_items(count: usize) -> Vec<SourceItem> {
    (1..=count)
        .map(|i| SourceItem::new(format!("vid-{}", i), format!("Song {}", i), "Artist"))
        .collect()
}

pub struct FakeSource {
    pub title: Option<String>,
    pub items: Vec<SourceItem>,
    pub fail_metadata: bool,
    pub fail_items: bool,
    pub calls: Mutex<Vec<&'static str>>,
}

impl FakeSource {
    pub fn new(title: &str, items: Vec<SourceItem>) -> Self {
        Self {
            title: Some(title.to_string()),
            items,
            fail_metadata: false,
            fail_items: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceCatalog for FakeSource {
    async fn fetch_collection_title(&self, _id: &str, _token: &str) -> Result<Option<String>, CatalogError> {
        self.calls.lock().unwrap().push("fetch_collection_title");
        if self.fail_metadata {
            return Err(http_error("/playlists", 500));
        }
        Ok(self.title.clone())
    }

    async fn fetch_all_items(&self, _id: &str, _token: &str) -> Result<Vec<SourceItem>, CatalogError> {
        self.calls.lock().unwrap().push("fetch_all_items");
        if self.fail_items {
            return Err(http_error("/playlistItems", 503));
        }
        Ok(self.items.clone())
    }

    async fn list_my_collections(&self, _token: &str) -> Result<Vec<SourcePlaylistSummary>, CatalogError> {
        self.calls.lock().unwrap().push("list_my_collections");
        Ok(Vec::new())
    }
}

pub struct FakeTarget {
    pub fail_identity: bool,
    pub fail_create: bool,
    /// 返回"无结果"的搜索词
    pub misses: HashSet<String>,
    /// 搜索调用报错的搜索词
    pub search_errors: HashSet<String>,
    /// 设置后所有搜索都返回这一条
    pub fixed_hit: Option<TargetSearchCandidate>,
    /// 失败的写入批次（从 1 开始计数）
    pub failing_batches: HashSet<usize>,
    pub identity_calls: Mutex<usize>,
    pub created: Mutex<Vec<(String, String, bool)>>,
    pub searches: Mutex<Vec<String>>,
    pub appends: Mutex<Vec<Vec<String>>>,
}

impl FakeTarget {
    pub fn new() -> Self {
        Self {
            fail_identity: false,
            fail_create: false,
            misses: HashSet::new(),
            search_errors: HashSet::new(),
            fixed_hit: None,
            failing_batches: HashSet::new(),
            identity_calls: Mutex::new(0),
            created: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
            appends: Mutex::new(Vec::new()),
        }
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn append_sizes(&self) -> Vec<usize> {
        self.appends.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn appended(&self) -> Vec<String> {
        self.appends.lock().unwrap().iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl TargetCatalog for FakeTarget {
    async fn resolve_current_identity(&self, _token: &str) -> Result<TargetUser, CatalogError> {
        *self.identity_calls.lock().unwrap() += 1;
        if self.fail_identity {
            return Err(http_error("/me", 401));
        }
        Ok(TargetUser { id: "spotify-user".to_string() })
    }

    async fn create_collection(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
        is_public: bool,
        _token: &str,
    ) -> Result<TargetCollection, CatalogError> {
        self.created
            .lock()
            .unwrap()
            .push((name.to_string(), description.to_string(), is_public));
        if self.fail_create {
            return Err(http_error("/users/spotify-user/playlists", 403));
        }
        Ok(TargetCollection {
            id: "new-playlist".to_string(),
            name: name.to_string(),
            owner_id: owner_id.to_string(),
            is_public,
        })
    }

    async fn search(&self, query: &str, _token: &str) -> Result<Option<TargetSearchCandidate>, CatalogError> {
        self.searches.lock().unwrap().push(query.to_string());
        if self.search_errors.contains(query) {
            return Err(http_error("/search", 502));
        }
        if let Some(hit) = &self.fixed_hit {
            return Ok(Some(hit.clone()));
        }
        if self.misses.contains(query) {
            return Ok(None);
        }
        Ok(Some(TargetSearchCandidate {
            id: query.to_string(),
            title: query.to_string(),
            artists: Vec::new(),
            uri: format!("spotify:track:{}", query.replace(' ', "_")),
        }))
    }

    async fn append_items(
        &self,
        _collection_id: &str,
        uris: &[String],
        _token: &str,
    ) -> Result<Option<String>, CatalogError> {
        let batch_number = {
            let mut appends = self.appends.lock().unwrap();
            appends.push(uris.to_vec());
            appends.len()
        };
        if self.failing_batches.contains(&batch_number) {
            return Err(CatalogError::Http {
                endpoint: "/playlists/new-playlist/tracks".to_string(),
                status: 500,
                body: "simulated".to_string(),
            });
        }
        Ok(Some(format!("snapshot-{}", batch_number)))
    }
}
