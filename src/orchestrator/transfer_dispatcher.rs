//! 转移调度器 - 编排层
//!
//! ## 职责
//!
//! 1. **后台启动**：`begin_transfer` 立即返回，转移在后台任务中运行
//! 2. **并发控制**：使用 Semaphore 限制同时运行的转移数量
//! 3. **前置校验**：`request_transfer` 在调度前同步获取两个令牌
//! 4. **兜底捕获**：任务内的 panic 被捕获并记录为严重失败
//!
//! 单个转移的细节全部委托给 `workflow::TransferFlow`。
//!
//! 任务通过 `TaskTracker` 派生为独立任务：调度器被 drop 不会取消正在进行的转移，
//! 已结束的任务也不会继续占用内存。

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::clients::{SourceCatalog, TargetCatalog};
use crate::config::Config;
use crate::error::AuthError;
use crate::services::{CatalogProvider, CredentialProvider};
use crate::workflow::{TransferCtx, TransferFlow};

/// 转移调度器
pub struct TransferDispatcher {
    flow: Arc<TransferFlow>,
    semaphore: Arc<Semaphore>,
    tracker: TaskTracker,
}

impl TransferDispatcher {
    pub fn new(source: Arc<dyn SourceCatalog>, target: Arc<dyn TargetCatalog>, config: &Config) -> Self {
        let permits = config.max_concurrent_transfers.max(1);
        Self {
            flow: Arc::new(TransferFlow::new(source, target, config)),
            semaphore: Arc::new(Semaphore::new(permits)),
            tracker: TaskTracker::new(),
        }
    }

    /// 后台启动一次转移，立即返回
    ///
    /// 需要在 tokio 运行时内调用。
    ///
    /// # 参数
    /// - `playlist_id`: 源播放列表ID
    /// - `target_token`: 目标平台令牌
    /// - `source_token`: 源平台令牌
    pub fn begin_transfer(&self, playlist_id: &str, target_token: &str, source_token: &str) {
        let ctx = TransferCtx::new(playlist_id, source_token, target_token);
        let flow = self.flow.clone();
        let semaphore = self.semaphore.clone();

        debug!("{} 📦 已加入调度队列 (在途 {})", ctx, self.tracker.len());

        self.tracker.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("{} ❌ 无法获取并发许可: {}", ctx, e);
                    return;
                }
            };

            let started = Instant::now();
            let result = AssertUnwindSafe(async { flow.run(&ctx).await })
                .catch_unwind()
                .await;

            if result.is_err() {
                error!(
                    playlist_id = %ctx.playlist_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "{} ❌ 转移过程中发生严重错误，任务已终止",
                    ctx
                );
            }
        });
    }

    /// 先获取两个平台的令牌，成功后再启动转移
    ///
    /// # 返回
    /// 令牌获取失败时返回错误，此时不会发起任何目录请求
    pub async fn request_transfer(
        &self,
        credentials: &dyn CredentialProvider,
        principal: &str,
        playlist_id: &str,
    ) -> Result<(), AuthError> {
        let source_token = credentials
            .access_token(principal, CatalogProvider::Youtube)
            .await?;
        let target_token = credentials
            .access_token(principal, CatalogProvider::Spotify)
            .await?;

        info!("[转移 {}] 🚀 用户 {} 发起转移", playlist_id, principal);
        self.begin_transfer(playlist_id, &target_token, &source_token);
        Ok(())
    }

    /// 尚未结束的转移数量（包括等待并发许可的）
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// 等待所有已调度的转移结束，之后仍可继续调度
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::error::CatalogError;
    use crate::models::{SourceItem, SourcePlaylistSummary};
    use crate::services::ConfigCredentialProvider;
    use crate::test_support::{numbered_items, FakeSource, FakeTarget};

    /// 在 `release` 被通知前一直阻塞的源目录
    struct GatedSource {
        inner: FakeSource,
        release: Notify,
    }

    #[async_trait]
    impl SourceCatalog for GatedSource {
        async fn fetch_collection_title(&self, id: &str, token: &str) -> Result<Option<String>, CatalogError> {
            self.release.notified().await;
            self.inner.fetch_collection_title(id, token).await
        }

        async fn fetch_all_items(&self, id: &str, token: &str) -> Result<Vec<SourceItem>, CatalogError> {
            self.inner.fetch_all_items(id, token).await
        }

        async fn list_my_collections(&self, token: &str) -> Result<Vec<SourcePlaylistSummary>, CatalogError> {
            self.inner.list_my_collections(token).await
        }
    }

    /// 记录同时在途请求峰值的源目录
    struct SlowSource {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        started: AtomicUsize,
    }

    #[async_trait]
    impl SourceCatalog for SlowSource {
        async fn fetch_collection_title(&self, _id: &str, _token: &str) -> Result<Option<String>, CatalogError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(None)
        }

        async fn fetch_all_items(&self, _id: &str, _token: &str) -> Result<Vec<SourceItem>, CatalogError> {
            Ok(Vec::new())
        }

        async fn list_my_collections(&self, _token: &str) -> Result<Vec<SourcePlaylistSummary>, CatalogError> {
            Ok(Vec::new())
        }
    }

    struct PanickingSource;

    #[async_trait]
    impl SourceCatalog for PanickingSource {
        async fn fetch_collection_title(&self, _id: &str, _token: &str) -> Result<Option<String>, CatalogError> {
            panic!("boom");
        }

        async fn fetch_all_items(&self, _id: &str, _token: &str) -> Result<Vec<SourceItem>, CatalogError> {
            Ok(Vec::new())
        }

        async fn list_my_collections(&self, _token: &str) -> Result<Vec<SourcePlaylistSummary>, CatalogError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_begin_transfer_returns_before_completion() {
        let source = Arc::new(GatedSource {
            inner: FakeSource::new("Mix", numbered_items(3)),
            release: Notify::new(),
        });
        let target = Arc::new(FakeTarget::new());
        let dispatcher = TransferDispatcher::new(source.clone(), target.clone(), &Config::default());

        dispatcher.begin_transfer("PL1", "sp-token", "yt-token");

        // 源目录尚未放行，目标侧不应有任何写入
        tokio::task::yield_now().await;
        assert!(target.created.lock().unwrap().is_empty());
        assert!(target.append_sizes().is_empty());

        source.release.notify_one();
        dispatcher.wait_idle().await;

        assert_eq!(target.created.lock().unwrap().len(), 1);
        assert_eq!(target.append_sizes(), vec![3]);
    }

    #[tokio::test]
    async fn test_transfer_survives_dropped_dispatcher() {
        let source = Arc::new(FakeSource::new("Mix", numbered_items(3)));
        let target = Arc::new(FakeTarget::new());
        {
            let dispatcher = TransferDispatcher::new(source.clone(), target.clone(), &Config::default());
            dispatcher.begin_transfer("PL1", "sp-token", "yt-token");
        }

        for _ in 0..100 {
            if !target.append_sizes().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(target.created.lock().unwrap().len(), 1);
        assert_eq!(target.append_sizes(), vec![3]);
    }

    #[tokio::test]
    async fn test_finished_transfers_are_released() {
        let source = Arc::new(FakeSource::new("Empty", Vec::new()));
        let target = Arc::new(FakeTarget::new());
        let dispatcher = TransferDispatcher::new(source, target, &Config::default());

        for i in 0..50 {
            dispatcher.begin_transfer(&format!("PL{}", i), "sp", "yt");
        }
        for _ in 0..100 {
            if dispatcher.in_flight() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        // 没有调用 wait_idle，结束的任务也已释放
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_concurrency_is_capped() {
        let source = Arc::new(SlowSource {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            started: AtomicUsize::new(0),
        });
        let target = Arc::new(FakeTarget::new());
        let config = Config {
            max_concurrent_transfers: 2,
            ..Config::default()
        };
        let dispatcher = TransferDispatcher::new(source.clone(), target, &config);

        for i in 0..6 {
            dispatcher.begin_transfer(&format!("PL{}", i), "sp", "yt");
        }
        dispatcher.wait_idle().await;

        assert_eq!(source.started.load(Ordering::SeqCst), 6);
        assert!(source.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let target = Arc::new(FakeTarget::new());
        let dispatcher = TransferDispatcher::new(Arc::new(PanickingSource), target.clone(), &Config::default());

        dispatcher.begin_transfer("PLpanic", "sp", "yt");
        dispatcher.wait_idle().await;

        assert!(target.created.lock().unwrap().is_empty());

        // 调度器在 panic 之后仍可继续使用
        dispatcher.begin_transfer("PLpanic2", "sp", "yt");
        dispatcher.wait_idle().await;
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_any_catalog_call() {
        let source = Arc::new(FakeSource::new("Mix", numbered_items(1)));
        let target = Arc::new(FakeTarget::new());
        let dispatcher = TransferDispatcher::new(source.clone(), target.clone(), &Config::default());
        let credentials = ConfigCredentialProvider::new(&Config {
            source_access_token: Some("yt".to_string()),
            target_access_token: None,
            ..Config::default()
        });

        let result = dispatcher
            .request_transfer(&credentials, &Config::default().principal, "PL1")
            .await;
        dispatcher.wait_idle().await;

        assert!(matches!(
            result,
            Err(AuthError::NotLinked { provider: CatalogProvider::Spotify })
        ));
        assert!(source.calls().is_empty());
        assert_eq!(*target.identity_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_request_transfer_dispatches_with_both_tokens() {
        let source = Arc::new(FakeSource::new("Mix", numbered_items(2)));
        let target = Arc::new(FakeTarget::new());
        let dispatcher = TransferDispatcher::new(source.clone(), target.clone(), &Config::default());
        let config = Config {
            source_access_token: Some("yt".to_string()),
            target_access_token: Some("sp".to_string()),
            ..Config::default()
        };
        let credentials = ConfigCredentialProvider::new(&config);

        dispatcher
            .request_transfer(&credentials, &config.principal, "PL1")
            .await
            .unwrap();
        dispatcher.wait_idle().await;

        assert_eq!(source.calls(), vec!["fetch_collection_title", "fetch_all_items"]);
        assert_eq!(target.append_sizes(), vec![2]);
    }
}
