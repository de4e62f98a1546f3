//! 播放列表转移流程 - 流程层
//!
//! 核心职责：定义"一次转移"的完整状态机
//!
//! 状态顺序：
//! 1. FetchingSourceMeta → ResolvingTargetIdentity → CreatingTargetCollection
//! 2. FetchingSourceItems → MatchingItems → WritingBatches
//! 3. Completed（任一前置步骤失败则进入 Failed）
//!
//! 目标播放列表一旦创建，后续失败也不会删除或重命名。

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::clients::{SourceCatalog, TargetCatalog, TARGET_MAX_BATCH_SIZE};
use crate::config::Config;
use crate::error::TransferError;
use crate::models::{SourceItem, TargetCollection, TransferOutcome, TransferReport, TransferState};
use crate::services::{partition, MatchingService};
use crate::workflow::transfer_ctx::TransferCtx;

/// 状态机内部步骤，携带进入该状态所需的数据
enum Step {
    FetchingSourceMeta,
    ResolvingTargetIdentity { title: String },
    CreatingTargetCollection { title: String, owner_id: String },
    FetchingSourceItems { collection_id: String },
    MatchingItems { collection_id: String, items: Vec<SourceItem> },
    WritingBatches { collection_id: String, uris: Vec<String> },
    Completed,
    Failed(TransferError),
}

impl Step {
    fn state(&self) -> TransferState {
        match self {
            Step::FetchingSourceMeta => TransferState::FetchingSourceMeta,
            Step::ResolvingTargetIdentity { .. } => TransferState::ResolvingTargetIdentity,
            Step::CreatingTargetCollection { .. } => TransferState::CreatingTargetCollection,
            Step::FetchingSourceItems { .. } => TransferState::FetchingSourceItems,
            Step::MatchingItems { .. } => TransferState::MatchingItems,
            Step::WritingBatches { .. } => TransferState::WritingBatches,
            Step::Completed => TransferState::Completed,
            Step::Failed(_) => TransferState::Failed,
        }
    }
}

/// 转移流程
///
/// - 编排完整的转移流程，决定何时搜索、何时写入
/// - 只依赖目录 trait 和匹配服务
/// - 单次转移内部严格串行：逐条匹配、逐批写入
pub struct TransferFlow {
    source: Arc<dyn SourceCatalog>,
    target: Arc<dyn TargetCatalog>,
    matcher: MatchingService,
    target_public: bool,
}

impl TransferFlow {
    pub fn new(source: Arc<dyn SourceCatalog>, target: Arc<dyn TargetCatalog>, config: &Config) -> Self {
        Self {
            matcher: MatchingService::from_config(target.clone(), config),
            source,
            target,
            target_public: config.target_playlist_public,
        }
    }

    /// 运行状态机直到 Completed 或 Failed，并输出一条结果日志
    pub async fn run(&self, ctx: &TransferCtx) -> TransferReport {
        let started = Instant::now();
        let mut outcome = TransferOutcome::new();
        let mut created: Option<TargetCollection> = None;
        let mut step = Step::FetchingSourceMeta;

        info!("{} 🚀 开始转移", ctx);

        while !step.state().is_terminal() {
            let from = step.state();
            step = match step {
                Step::FetchingSourceMeta => self.fetch_source_meta(ctx).await,
                Step::ResolvingTargetIdentity { title } => self.resolve_identity(ctx, title).await,
                Step::CreatingTargetCollection { title, owner_id } => {
                    match self.create_collection(ctx, &title, &owner_id).await {
                        Ok(collection) => {
                            let collection_id = collection.id.clone();
                            created = Some(collection);
                            Step::FetchingSourceItems { collection_id }
                        }
                        Err(e) => Step::Failed(e),
                    }
                }
                Step::FetchingSourceItems { collection_id } => {
                    self.fetch_items(ctx, collection_id, &mut outcome).await
                }
                Step::MatchingItems { collection_id, items } => {
                    self.match_items(ctx, collection_id, items, &mut outcome).await
                }
                Step::WritingBatches { collection_id, uris } => {
                    self.write_batches(ctx, &collection_id, uris, &mut outcome).await
                }
                terminal @ (Step::Completed | Step::Failed(_)) => terminal,
            };
            debug!("{} 状态: {} → {}", ctx, from, step.state());
        }

        outcome.elapsed = started.elapsed();
        let (state, failure) = match step {
            Step::Failed(reason) => (TransferState::Failed, Some(reason)),
            other => (other.state(), None),
        };

        let report = TransferReport {
            playlist_id: ctx.playlist_id.clone(),
            state,
            outcome,
            target_collection: created,
            failure,
        };
        report.log();
        report
    }

    async fn fetch_source_meta(&self, ctx: &TransferCtx) -> Step {
        debug!("{} 获取源播放列表详情...", ctx);
        match self
            .source
            .fetch_collection_title(&ctx.playlist_id, &ctx.source_token)
            .await
        {
            Ok(Some(title)) => {
                info!("{} 源播放列表名称: '{}'", ctx, title);
                Step::ResolvingTargetIdentity { title }
            }
            Ok(None) => Step::Failed(TransferError::SourceNotFound {
                playlist_id: ctx.playlist_id.clone(),
            }),
            Err(e) => Step::Failed(TransferError::SourceMetadata(e)),
        }
    }

    async fn resolve_identity(&self, ctx: &TransferCtx, title: String) -> Step {
        match self.target.resolve_current_identity(&ctx.target_token).await {
            Ok(user) => {
                info!("{} 目标用户ID: {}", ctx, user.id);
                Step::CreatingTargetCollection {
                    title,
                    owner_id: user.id,
                }
            }
            Err(e) => Step::Failed(TransferError::TargetIdentity(e)),
        }
    }

    async fn create_collection(
        &self,
        ctx: &TransferCtx,
        title: &str,
        owner_id: &str,
    ) -> Result<TargetCollection, TransferError> {
        let description = format!("Transferred from YouTube Playlist: {}", title);
        let collection = self
            .target
            .create_collection(owner_id, title, &description, self.target_public, &ctx.target_token)
            .await
            .map_err(TransferError::TargetCreate)?;

        info!("{} ✓ 已创建目标播放列表 '{}' (ID: {})", ctx, collection.name, collection.id);
        Ok(collection)
    }

    async fn fetch_items(&self, ctx: &TransferCtx, collection_id: String, outcome: &mut TransferOutcome) -> Step {
        let items = match self
            .source
            .fetch_all_items(&ctx.playlist_id, &ctx.source_token)
            .await
        {
            Ok(items) => items,
            Err(e) => return Step::Failed(TransferError::SourceItems(e)),
        };

        outcome.total = items.len();
        info!("{} 源播放列表共 {} 个条目", ctx, items.len());

        if items.is_empty() {
            info!("{} 源播放列表为空，转移结束", ctx);
            return Step::Completed;
        }
        Step::MatchingItems { collection_id, items }
    }

    async fn match_items(
        &self,
        ctx: &TransferCtx,
        collection_id: String,
        items: Vec<SourceItem>,
        outcome: &mut TransferOutcome,
    ) -> Step {
        let total = items.len();
        let mut uris = Vec::with_capacity(total);

        for (index, item) in items.iter().enumerate() {
            info!(
                "{} [条目 {}/{}] '{}' by '{}'",
                ctx,
                index + 1,
                total,
                item.title,
                item.channel
            );
            let query = MatchingService::build_query(item);

            match self.matcher.find_best_match(&query, &ctx.target_token).await {
                Ok(Some(track)) => {
                    debug!("{}   -> 匹配: '{}' ({})", ctx, track.title, track.uri);
                    outcome.matched += 1;
                    uris.push(track.uri);
                }
                Ok(None) => {
                    warn!("{}   -> ⚠️ 未找到匹配: '{}'，跳过", ctx, query);
                    outcome.unmatched += 1;
                }
                Err(e) => {
                    warn!("{}   -> ⚠️ 搜索出错，按未匹配处理: {}", ctx, e);
                    outcome.unmatched += 1;
                    outcome.search_errors += 1;
                }
            }
        }

        info!("{} 搜索完成: 匹配 {}，未匹配 {}", ctx, outcome.matched, outcome.unmatched);
        Step::WritingBatches { collection_id, uris }
    }

    async fn write_batches(
        &self,
        ctx: &TransferCtx,
        collection_id: &str,
        uris: Vec<String>,
        outcome: &mut TransferOutcome,
    ) -> Step {
        if uris.is_empty() {
            info!("{} 没有可写入的曲目", ctx);
            return Step::Completed;
        }

        info!(
            "{} 📤 写入 {} 首曲目到播放列表 {}，每批 {} 首",
            ctx,
            uris.len(),
            collection_id,
            TARGET_MAX_BATCH_SIZE
        );

        let mut offset = 0;
        for batch in partition(&uris, TARGET_MAX_BATCH_SIZE) {
            let (start, end) = (offset + 1, offset + batch.len());
            offset = end;
            outcome.batches_attempted += 1;

            match self
                .target
                .append_items(collection_id, batch, &ctx.target_token)
                .await
            {
                Ok(snapshot) => {
                    outcome.tracks_added += batch.len();
                    match snapshot {
                        Some(snapshot) => debug!("{}   -> 批次 {}-{} 写入成功 ({})", ctx, start, end, snapshot),
                        None => warn!("{}   -> 批次 {}-{} 未返回确认令牌", ctx, start, end),
                    }
                }
                Err(e) => {
                    error!("{}   -> ❌ 批次 {}-{} 写入失败: {}", ctx, start, end, e);
                    outcome.write_failures += 1;
                }
            }
        }

        info!("{} ✓ 写入结束，成功写入 {} 首", ctx, outcome.tracks_added);
        Step::Completed
    }
}
