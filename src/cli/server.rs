use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use log::{info, warn};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::cli::SubCommandExtend;
use crate::config::ServerOptions;
use crate::schema::SchemaManager;
use crate::{Context, Opts, server};

#[derive(Parser, Debug, Clone)]
pub struct ServerCommand {
    #[command(flatten)]
    pub server: ServerOptions,
    /// 启动前删除并重新创建集合，失败时不启动服务
    #[arg(long)]
    pub reset: bool,
    /// 启动前导入该目录中的图片
    #[arg(long, value_name = "DIR")]
    pub import: Option<PathBuf>,
}

impl SubCommandExtend for ServerCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let engine = opts.engine.connect()?;

        if self.reset {
            SchemaManager::new(engine.clone())
                .reset_collection(&Context::new())
                .await
                .context("初始化集合失败")?;
        }
        if let Some(path) = &self.import {
            super::import_images(engine.clone(), path).await?;
        }

        let static_dir = &self.server.static_dir;
        tokio::fs::create_dir_all(static_dir)
            .await
            .with_context(|| format!("创建目录 {} 失败", static_dir.display()))?;
        info!("上传图片暂存目录: {}", static_dir.display());

        // 创建应用状态
        let shutdown = CancellationToken::new();
        let state = server::AppState::new(engine, static_dir, opts.engine.timeout(), shutdown.clone());

        // 创建应用
        let app = server::create_app(state, self.server.body_limit);

        // 启动服务器
        info!("服务器启动：http://{}", &self.server.addr);
        let listener = TcpListener::bind(&self.server.addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("收到中断信号，正在关闭服务器");
                }
                shutdown.cancel();
            })
            .await?;

        Ok(())
    }
}
