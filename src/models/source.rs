use serde::{Deserialize, Serialize};

/// 源播放列表中的一个条目（视频）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    /// 视频ID
    pub id: String,
    /// 视频标题
    pub title: String,
    /// 上传频道名称
    pub channel: String,
}

impl SourceItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            channel: channel.into(),
        }
    }
}

/// 源播放列表（标题 + 有序条目）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCollection {
    pub id: String,
    pub title: String,
    pub items: Vec<SourceItem>,
}

/// 当前用户拥有的源播放列表摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePlaylistSummary {
    pub id: String,
    pub title: String,
    pub item_count: Option<u64>,
}
