use serde::{Deserialize, Serialize};

/// 目标平台搜索返回的候选曲目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSearchCandidate {
    pub id: String,
    pub title: String,
    pub artists: Vec<String>,
    /// 写入播放列表时使用的 URI（如 `spotify:track:xxxx`）
    pub uri: String,
}

impl TargetSearchCandidate {
    /// 是否带有可用于写入的 URI
    pub fn has_uri(&self) -> bool {
        !self.uri.trim().is_empty()
    }
}

/// 目标平台新建的播放列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCollection {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub is_public: bool,
}

/// 目标平台当前用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetUser {
    pub id: String,
}
