/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 默认日志过滤规则
///
/// # 参数
/// - `verbose`: 是否输出 debug 级别日志
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "playlist_transfer=debug"
    } else {
        "playlist_transfer=info"
    }
}

/// 初始化日志
///
/// 设置了 `RUST_LOG` 时以环境变量为准。重复调用不会报错。
///
/// # 参数
/// - `verbose`: 是否输出 debug 级别日志
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 当前配置
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - 播放列表转移 ({})",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📊 最大并发转移数: {}", config.max_concurrent_transfers);
    info!("🔗 源目录: {}", config.source_api_base_url);
    info!("🔗 目标目录: {}", config.target_api_base_url);
    match config.match_threshold {
        Some(threshold) => info!("🎯 匹配阈值: {:.2}", threshold),
        None => info!("🎯 匹配阈值: 无（接受第一条结果）"),
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("播放列表转移工具", 4), "播放列表...");
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "playlist_transfer=info");
        assert_eq!(default_filter(true), "playlist_transfer=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
