pub mod commands;
pub mod infrastructure;
pub mod modules;
pub mod shared;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use infrastructure::AppState;
use modules::chat::{create_adapter, ChatModule, MessageRepository, SqliteMessageRepository};
use modules::config::{ConfigModule, ServerConfig, DEFAULT_CONFIG_FILE};
use modules::directory::FileUserDirectory;
use modules::session::SessionController;
use shared::{AppError, AppResult};

const DEFAULT_LOG_FILTER: &str = "datasci_chat=debug,datasci_chat_lib=debug";

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "datasci-chat", version, about = "DataScience Chatbot web server")]
pub struct Cli {
    /// 配置文件路径
    #[arg(long, env = "DATASCI_CHAT_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// 覆盖配置中的监听地址
    #[arg(long)]
    pub bind: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Command {
    /// 启动 Web 服务（默认）
    Serve,
    /// 创建会话存储表后退出
    InitDb,
}

/// 初始化日志（RUST_LOG 优先）
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

pub async fn run(cli: Cli) -> AppResult<()> {
    init_tracing();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&cli.config, cli.bind).await,
        Command::InitDb => init_db(&cli.config).await,
    }
}

/// 组装应用状态，返回状态与监听地址
///
/// 配置错误不会中断启动，页面改为只显示错误；存储初始化失败则是致命错误
pub async fn build_state(config_module: &ConfigModule) -> AppResult<(Arc<AppState>, String)> {
    let runtime = match config_module.load_runtime().await {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Configuration error: {}", e);
            let bind_addr = config_module
                .load()
                .await
                .map(|config| config.server.bind_addr)
                .unwrap_or_else(|_| ServerConfig::default().bind_addr);
            let state = AppState::unavailable(AppError::from(e).to_string());
            return Ok((Arc::new(state), bind_addr));
        }
    };

    let config = &runtime.config;
    tokio::fs::create_dir_all(&config.storage.data_dir).await?;

    let llm = create_adapter(&runtime.provider_config())?;
    let chat = ChatModule::new_with_persistence(
        config.storage.database_path(),
        llm,
        runtime.chat_settings(),
    )
    .await?;
    info!(
        "Conversation store ready at {:?}",
        config.storage.database_path()
    );

    let directory = FileUserDirectory::new(config.storage.user_file_path())
        .with_policy(config.chat.duplicate_names);
    let controller = SessionController::new(Arc::new(directory), Arc::new(chat));

    Ok((
        Arc::new(AppState::ready(Arc::new(controller))),
        config.server.bind_addr.clone(),
    ))
}

async fn serve(config_path: &Path, bind_override: Option<String>) -> AppResult<()> {
    info!("DataScience Chatbot starting...");

    let config_module = ConfigModule::from_env(config_path);
    let (state, bind_addr) = build_state(&config_module).await?;
    let bind_addr = bind_override.unwrap_or(bind_addr);

    let app = commands::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn init_db(config_path: &Path) -> AppResult<()> {
    let config = ConfigModule::from_env(config_path).load().await?;
    let path = config.storage.database_path();

    let result = async {
        tokio::fs::create_dir_all(&config.storage.data_dir)
            .await
            .map_err(AppError::from)?;
        let repository = SqliteMessageRepository::open(&path)?;
        repository.ensure_schema().await?;
        Ok::<(), AppError>(())
    }
    .await;

    match result {
        Ok(()) => {
            info!("Initialized message store at {:?}", path);
            println!("Database initialized successfully!");
            Ok(())
        }
        Err(e) => {
            println!("Database Error: {}", e);
            Err(e)
        }
    }
}
