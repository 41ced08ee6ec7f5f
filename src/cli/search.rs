use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use log::info;

use crate::cli::SubCommandExtend;
use crate::query::{QueryPipeline, ResultSet};
use crate::{Context, Opts, encode};

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    /// 被搜索的图片路径
    pub image: PathBuf,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
    /// 将结果图片解码后保存到该目录，文件名为排名
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl SubCommandExtend for SearchCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let pipeline = QueryPipeline::new(opts.engine.connect()?);
        let ctx = Context::new().with_timeout(opts.engine.timeout());
        let result = pipeline.search_ranked(&ctx, &self.image).await?;
        info!("找到 {} 张相似图片", result.len());

        if let Some(dir) = &self.output {
            save_result(&result, dir).await?;
        }

        print_result(result, self.output_format)
    }
}

async fn save_result(result: &ResultSet, dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("创建目录 {} 失败", dir.display()))?;
    for (rank, image) in result.iter().enumerate() {
        let path = dir.join(format!("{:02}.jpg", rank + 1));
        tokio::fs::write(&path, encode::from_base64(image)?).await?;
        info!("保存结果: {}", path.display());
    }
    Ok(())
}

fn print_result(result: ResultSet, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result.padded())?)
        }
        OutputFormat::Table => {
            for (rank, image) in result.iter().enumerate() {
                println!("{}\t{}", rank + 1, abbreviate(image, 48));
            }
        }
    }
    Ok(())
}

/// 截断过长的 base64 字符串
fn abbreviate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &s[..end]),
        None => s.to_string(),
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Table,
}
