//! 转移上下文
//!
//! 封装"我正在转移哪个播放列表、用哪两个令牌"这一信息

use std::fmt::{Debug, Display};

/// 转移上下文
///
/// 令牌只在本次转移内使用，不会出现在日志中
#[derive(Clone)]
pub struct TransferCtx {
    /// 源播放列表ID
    pub playlist_id: String,
    /// 源平台令牌
    pub source_token: String,
    /// 目标平台令牌
    pub target_token: String,
}

impl TransferCtx {
    pub fn new(playlist_id: impl Into<String>, source_token: impl Into<String>, target_token: impl Into<String>) -> Self {
        Self {
            playlist_id: playlist_id.into(),
            source_token: source_token.into(),
            target_token: target_token.into(),
        }
    }
}

impl Display for TransferCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[转移 {}]", self.playlist_id)
    }
}

impl Debug for TransferCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferCtx")
            .field("playlist_id", &self.playlist_id)
            .field("source_token", &"***")
            .field("target_token", &"***")
            .finish()
    }
}
