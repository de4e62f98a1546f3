use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use playlist_transfer::clients::{SourceCatalog, SpotifyClient, YoutubeClient};
use playlist_transfer::error::AppResult;
use playlist_transfer::services::{CatalogProvider, ConfigCredentialProvider, CredentialProvider, MatchingService};
use playlist_transfer::utils::logging;
use playlist_transfer::{Config, HttpExecutor, TransferDispatcher};

/// 把 YouTube 播放列表转移到 Spotify
#[derive(Parser, Debug)]
#[command(name = "playlist_transfer", version, about)]
struct Cli {
    /// TOML 配置文件路径
    #[arg(long, env = "TRANSFER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// 输出 debug 级别日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 列出当前用户的 YouTube 播放列表
    Playlists,
    /// 显示一个 YouTube 播放列表的标题和条目
    Items {
        /// YouTube 播放列表ID
        playlist_id: String,
    },
    /// 在 Spotify 上搜索（先清洗搜索词）
    Search {
        /// 原始搜索词，例如视频标题
        query: String,
    },
    /// 转移一个 YouTube 播放列表并等待完成
    Transfer {
        /// YouTube 播放列表ID
        playlist_id: String,
    },
}

/// 应用主结构
struct App {
    config: Config,
    source: Arc<YoutubeClient>,
    target: Arc<SpotifyClient>,
    credentials: ConfigCredentialProvider,
}

impl App {
    fn initialize(config: Config) -> AppResult<Self> {
        let executor = HttpExecutor::new(&config)?;
        Ok(Self {
            source: Arc::new(YoutubeClient::from_config(executor.clone(), &config)),
            target: Arc::new(SpotifyClient::from_config(executor, &config)),
            credentials: ConfigCredentialProvider::new(&config),
            config,
        })
    }

    async fn token(&self, provider: CatalogProvider) -> AppResult<String> {
        Ok(self
            .credentials
            .access_token(&self.config.principal, provider)
            .await?)
    }

    async fn list_playlists(&self) -> AppResult<()> {
        let token = self.token(CatalogProvider::Youtube).await?;
        let playlists = self.source.list_my_collections(&token).await?;
        info!("✓ 找到 {} 个播放列表", playlists.len());
        print_json(&playlists);
        Ok(())
    }

    async fn show_items(&self, playlist_id: &str) -> AppResult<()> {
        let token = self.token(CatalogProvider::Youtube).await?;
        match self.source.fetch_collection(playlist_id, &token).await? {
            Some(collection) => print_json(&collection),
            None => warn!("⚠️ 未找到播放列表: {}", playlist_id),
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> AppResult<()> {
        let token = self.token(CatalogProvider::Spotify).await?;
        let matcher = MatchingService::from_config(self.target.clone(), &self.config);
        match matcher.find_best_match(query, &token).await? {
            Some(track) => print_json(&track),
            None => warn!("⚠️ 未找到匹配: '{}'", query),
        }
        Ok(())
    }

    async fn transfer(&self, playlist_id: &str) -> AppResult<()> {
        let dispatcher = TransferDispatcher::new(self.source.clone(), self.target.clone(), &self.config);
        dispatcher
            .request_transfer(&self.credentials, &self.config.principal, playlist_id)
            .await?;
        dispatcher.wait_idle().await;
        Ok(())
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!("⚠️ 输出 JSON 失败: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref()).context("加载配置失败")?;

    // 初始化日志
    logging::init(cli.verbose || config.verbose_logging);
    logging::log_startup(&config);

    // 初始化并运行应用
    let app = App::initialize(config)?;
    match cli.command {
        Command::Playlists => app.list_playlists().await?,
        Command::Items { playlist_id } => app.show_items(&playlist_id).await?,
        Command::Search { query } => app.search(&query).await?,
        Command::Transfer { playlist_id } => app.transfer(&playlist_id).await?,
    }

    Ok(())
}
