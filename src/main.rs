//! Novel Shelf：网络小说书库（抓取 + 机器翻译）。
//!
//! 代码结构（读代码入口）：
//! - `base_system`：配置/日志等基础设施
//! - `library`：书库核心（标题提取、术语表合并、章节定位、目录同步、文档存储）
//! - `third_party`：抓取/正文提取/翻译外部服务客户端
//! - `ui`：Web JSON API 与命令行子命令

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;

mod base_system;
mod library;
mod third_party;
mod ui;

use base_system::config::load_or_create;
use base_system::context::Config;
use base_system::logging::{LogOptions, LogSystem};
use library::Library;
use library::store::NovelStore;
use third_party::service_client::HttpNovelService;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "novel-shelf", version)]
#[command(about = "Personal library for scraped, machine-translated web novels")]
struct Cli {
    /// 启用调试日志输出
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,

    /// 数据目录（存放 config.yml、logs 与书库）
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 启动 Web JSON API
    Serve,
    /// 抓取并收录一本小说
    Add { url: String },
    /// 列出书库
    List,
    /// 从来源追加新章节
    Sync { id: String },
    /// 删除一本小说
    Delete { id: String },
    /// 书库统计
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.as_deref();

    let _log = init_logging(cli.debug, matches!(cli.command, Command::Serve), data_dir)?;

    let config = load_or_create::<Config>(data_dir).map_err(|e| anyhow!(e.to_string()))?;
    let library_root = config.library_dir(data_dir);
    let library = open_library(&config, &library_root)?;

    match cli.command {
        Command::Serve => {
            info!(target: "startup", "novel-shelf v{VERSION}, library at {}", library_root.display());
            ui::web::run(&config, library, library_root)
        }
        Command::Add { url } => ui::noui::add(&library, &url),
        Command::List => ui::noui::list(&library),
        Command::Sync { id } => ui::noui::sync(&library, &id),
        Command::Delete { id } => ui::noui::delete(&library, &id),
        Command::Stats => ui::noui::stats(&library),
    }
}

fn open_library(config: &Config, root: &Path) -> Result<Library> {
    let store = NovelStore::open(root)
        .with_context(|| format!("open library store at {}", root.display()))?;
    let service = HttpNovelService::from_config(config).context("build service client")?;
    Ok(Library::new(store, Arc::new(service)))
}

fn init_logging(debug: bool, console: bool, base_dir: Option<&Path>) -> Result<LogSystem> {
    let opts = LogOptions {
        debug,
        console,
        ..LogOptions::default()
    };
    LogSystem::init_with_base(opts, base_dir).map_err(|e| anyhow!(e))
}
