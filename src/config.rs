use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::cli::*;
use crate::engine::{VectorEngine, WeaviateClient};

static STATIC_DIR: LazyLock<String> = LazyLock::new(|| {
    ProjectDirs::from("", "", "imquery")
        .map(|dirs| dirs.cache_dir().join("static"))
        .unwrap_or_else(|| PathBuf::from("static"))
        .to_string_lossy()
        .to_string()
});

fn default_static_dir() -> &'static str {
    STATIC_DIR.as_str()
}

#[derive(Parser, Debug, Clone)]
#[command(name = "imquery", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    #[command(flatten)]
    pub engine: EngineOptions,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 创建图片集合
    Create(CreateCommand),
    /// 删除图片集合以及其中的所有图片
    Delete(DeleteCommand),
    /// 删除并重新创建图片集合
    Reset(ResetCommand),
    /// 导入目录中的图片
    Import(ImportCommand),
    /// 从集合中搜索相似图片
    Search(SearchCommand),
    /// 启动 HTTP 搜索服务
    Server(ServerCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct EngineOptions {
    /// 向量搜索引擎地址
    #[arg(
        long,
        global = true,
        env = "IMQUERY_ENGINE_URL",
        value_name = "URL",
        default_value = "http://localhost:8080"
    )]
    pub engine_url: String,
    /// 向量搜索引擎的 API key
    #[arg(long, global = true, env = "IMQUERY_API_KEY", value_name = "KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// 单次引擎请求的超时时间，单位为秒
    #[arg(long, global = true, value_name = "SECONDS", default_value_t = 60)]
    pub timeout: u64,
}

impl EngineOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// 连接向量搜索引擎
    pub fn connect(&self) -> anyhow::Result<Arc<dyn VectorEngine>> {
        let client = WeaviateClient::new(&self.engine_url, self.api_key.clone(), self.timeout())?;
        Ok(Arc::new(client))
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ServerOptions {
    /// 监听地址
    #[arg(long, default_value = "127.0.0.1:8085")]
    pub addr: String,
    /// 上传图片的暂存目录
    #[arg(long, value_name = "DIR", default_value = default_static_dir())]
    pub static_dir: PathBuf,
    /// 上传图片的大小上限，单位为字节
    #[arg(long, value_name = "BYTES", default_value_t = crate::server::DEFAULT_BODY_LIMIT)]
    pub body_limit: usize,
}
