//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责后台调度和并发控制，不做具体业务判断。
//!
//! ## 层次关系
//!
//! ```text
//! transfer_dispatcher (后台调度多个转移)
//!     ↓
//! workflow::TransferFlow (处理单个播放列表)
//!     ↓
//! services (能力层：matching / batcher / credential)
//!     ↓
//! clients (目录 API：YouTube / Spotify)
//!     ↓
//! infrastructure (基础设施：HttpExecutor)
//! ```

pub mod transfer_dispatcher;

pub use transfer_dispatcher::TransferDispatcher;
