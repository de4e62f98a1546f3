//! 转移结果
//!
//! 每次转移独占一份 `TransferOutcome`，随状态机按值传递，结束时统一输出一次。

use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{error, info};

use crate::error::TransferError;
use crate::models::target::TargetCollection;

/// 转移状态机的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    FetchingSourceMeta,
    ResolvingTargetIdentity,
    CreatingTargetCollection,
    FetchingSourceItems,
    MatchingItems,
    WritingBatches,
    Completed,
    Failed,
}

impl TransferState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransferState::Completed | TransferState::Failed)
    }
}

impl Display for TransferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransferState::FetchingSourceMeta => "FetchingSourceMeta",
            TransferState::ResolvingTargetIdentity => "ResolvingTargetIdentity",
            TransferState::CreatingTargetCollection => "CreatingTargetCollection",
            TransferState::FetchingSourceItems => "FetchingSourceItems",
            TransferState::MatchingItems => "MatchingItems",
            TransferState::WritingBatches => "WritingBatches",
            TransferState::Completed => "Completed",
            TransferState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// 单次转移的统计
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub started_at: DateTime<Local>,
    /// 源条目总数
    pub total: usize,
    /// 找到匹配的条目数
    pub matched: usize,
    /// 未找到匹配的条目数（包含搜索出错的条目）
    pub unmatched: usize,
    /// 搜索调用出错的条目数
    pub search_errors: usize,
    /// 已尝试写入的批次数
    pub batches_attempted: usize,
    /// 写入失败的批次数
    pub write_failures: usize,
    /// 实际写入成功的曲目数
    pub tracks_added: usize,
    pub elapsed: Duration,
}

impl TransferOutcome {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            total: 0,
            matched: 0,
            unmatched: 0,
            search_errors: 0,
            batches_attempted: 0,
            write_failures: 0,
            tracks_added: 0,
            elapsed: Duration::ZERO,
        }
    }
}

impl Default for TransferOutcome {
    fn default() -> Self {
        Self::new()
    }
}

/// 状态机运行结束后的报告
#[derive(Debug)]
pub struct TransferReport {
    pub playlist_id: String,
    pub state: TransferState,
    pub outcome: TransferOutcome,
    pub target_collection: Option<TargetCollection>,
    pub failure: Option<TransferError>,
}

impl TransferReport {
    pub fn is_completed(&self) -> bool {
        self.state == TransferState::Completed
    }

    /// 输出唯一一条结果日志
    pub fn log(&self) {
        let o = &self.outcome;
        let elapsed_ms = o.elapsed.as_millis() as u64;
        let target_id = self
            .target_collection
            .as_ref()
            .map(|c| c.id.as_str())
            .unwrap_or("-");

        if self.is_completed() {
            info!(
                playlist_id = %self.playlist_id,
                target_playlist_id = %target_id,
                state = %self.state,
                total = o.total,
                matched = o.matched,
                unmatched = o.unmatched,
                search_errors = o.search_errors,
                batches = o.batches_attempted,
                write_failures = o.write_failures,
                tracks_added = o.tracks_added,
                elapsed_ms,
                "✅ 转移完成"
            );
        } else {
            let reason = self
                .failure
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            error!(
                playlist_id = %self.playlist_id,
                target_playlist_id = %target_id,
                state = %self.state,
                total = o.total,
                matched = o.matched,
                unmatched = o.unmatched,
                write_failures = o.write_failures,
                elapsed_ms,
                reason = %reason,
                "❌ 转移失败"
            );
        }
    }
}
