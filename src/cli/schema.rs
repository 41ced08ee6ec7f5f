use anyhow::{Context as _, Result};
use clap::Parser;
use log::info;

use crate::cli::SubCommandExtend;
use crate::schema::SchemaManager;
use crate::{Context, Opts};

#[derive(Parser, Debug, Clone)]
pub struct CreateCommand {}

impl SubCommandExtend for CreateCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let manager = SchemaManager::new(opts.engine.connect()?);
        manager.create_collection(&Context::new()).await.context("创建集合失败")?;
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {}

impl SubCommandExtend for DeleteCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let manager = SchemaManager::new(opts.engine.connect()?);
        manager.delete_collection(&Context::new()).await.context("删除集合失败")?;
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ResetCommand {
    /// 重建后导入该目录中的图片
    #[arg(long, value_name = "DIR")]
    pub import: Option<std::path::PathBuf>,
}

impl SubCommandExtend for ResetCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let engine = opts.engine.connect()?;
        info!("重置集合");
        SchemaManager::new(engine.clone())
            .reset_collection(&Context::new())
            .await
            .context("重置集合失败")?;
        if let Some(path) = &self.import {
            super::import_images(engine, path).await?;
        }
        Ok(())
    }
}
