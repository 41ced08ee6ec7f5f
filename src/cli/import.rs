use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use indicatif::ProgressBar;
use log::{info, warn};

use crate::cli::SubCommandExtend;
use crate::engine::VectorEngine;
use crate::ingest::Importer;
use crate::utils::pb_style;
use crate::{Context, Opts};

#[derive(Parser, Debug, Clone)]
pub struct ImportCommand {
    /// 图片所在目录，只导入该目录下的文件，不扫描子目录
    pub path: PathBuf,
}

impl SubCommandExtend for ImportCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        import_images(opts.engine.connect()?, &self.path).await
    }
}

/// 导入目录中的图片，收到 Ctrl-C 时停止提交，已写入的图片保留
pub(crate) async fn import_images(engine: Arc<dyn VectorEngine>, path: &Path) -> Result<()> {
    let ctx = Context::new();
    let token = ctx.token().clone();
    let guard = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到中断信号，停止导入");
            token.cancel();
        }
    });

    let pb = ProgressBar::no_length().with_style(pb_style());
    let result = Importer::new(engine).with_progress(pb.clone()).import_all(&ctx, path).await;
    guard.abort();

    let report = result.with_context(|| format!("导入 {} 失败", path.display()))?;
    pb.finish_with_message("图片导入完成");
    info!("成功导入 {} 张图片，跳过 {} 项", report.imported, report.skipped);
    Ok(())
}
