//! # Playlist Transfer
//!
//! 把 YouTube 播放列表转移到 Spotify 的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 HTTP 连接池，只暴露能力
//! - `HttpExecutor` - 带 Bearer 令牌的 GET / POST，统一错误转换
//!
//! ### ② 目录客户端（Clients）
//! - `clients/` - 源目录与目标目录的 trait 及 REST 实现
//! - `YoutubeClient` - 播放列表标题、条目分页、我的播放列表
//! - `SpotifyClient` - 当前用户、新建播放列表、搜索、批量写入
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个条目或单批数据
//! - `MatchingService` - 搜索词清洗与匹配判断
//! - `partition` - 按目标 API 上限分批
//! - `CredentialProvider` - 获取访问令牌
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一个播放列表"的完整转移流程
//! - `TransferCtx` - 上下文封装（playlist_id + 两个令牌）
//! - `TransferFlow` - 状态机（标题 → 用户 → 新建 → 条目 → 匹配 → 写入）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/transfer_dispatcher` - 后台调度，控制并发

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod test_support;

// 重新导出常用类型
pub use clients::{SourceCatalog, SpotifyClient, TargetCatalog, YoutubeClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::HttpExecutor;
pub use orchestrator::TransferDispatcher;
pub use workflow::{TransferCtx, TransferFlow};
