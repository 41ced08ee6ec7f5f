use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use log::{debug, info, warn};
use serde_json::json;
use walkdir::WalkDir;

use crate::context::Context;
use crate::engine::{BatchObject, VectorEngine};
use crate::error::{Error, Result};
use crate::schema::COLLECTION_NAME;
use crate::{encode, metrics};

/// 一张待写入的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// 文件名，仅作为元数据保存
    pub filename: String,
    /// base64 编码后的图片
    pub image: String,
}

impl Item {
    /// 转换为引擎的批量写入对象
    pub fn into_object(self, class: &str) -> BatchObject {
        BatchObject {
            class: class.to_string(),
            properties: json!({ "filename": self.filename, "image": self.image }),
        }
    }
}

/// 导入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// 成功写入的图片数量
    pub imported: usize,
    /// 跳过的目录项数量，例如子目录
    pub skipped: usize,
}

/// 将目录中的图片逐张写入集合
///
/// 每张图片作为一次独立的批量写入提交，遇到第一个失败立即中止。
/// 已经写入的图片不会回滚。
pub struct Importer {
    engine: Arc<dyn VectorEngine>,
    class: String,
    pb: ProgressBar,
}

impl Importer {
    pub fn new(engine: Arc<dyn VectorEngine>) -> Self {
        Self { engine, class: COLLECTION_NAME.to_string(), pb: ProgressBar::hidden() }
    }

    /// 使用进度条报告导入进度
    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.pb = pb;
        self
    }

    /// 导入目录（不递归）下的所有文件，按文件名顺序
    pub async fn import_all(&self, ctx: &Context, dir: impl AsRef<Path>) -> Result<ImportReport> {
        let dir = dir.as_ref();
        info!("开始扫描目录: {}", dir.display());
        let (files, skipped) = list_files(dir)?;
        info!("扫描完成，共 {} 个文件，跳过 {} 项", files.len(), skipped);

        let total = files.len();
        self.pb.set_length(total as u64);

        for (i, path) in files.iter().enumerate() {
            let filename = file_name(path);
            if let Err(e) = self.import_one(ctx, path, &filename).await {
                warn!("导入 {filename} 时中止，之前写入的 {i}/{total} 张图片已保留");
                return Err(e);
            }
            metrics::inc_import_count();
            debug!("{}/{} {}", i + 1, total, filename);
            self.pb.set_message(filename);
            self.pb.inc(1);
        }

        Ok(ImportReport { imported: total, skipped })
    }

    async fn import_one(&self, ctx: &Context, path: &Path, filename: &str) -> Result<()> {
        let image = encode::read_base64(path).await?;
        let object = Item { filename: filename.to_string(), image }.into_object(&self.class);

        let acks = ctx
            .run(async {
                self.engine.batch_objects(std::slice::from_ref(&object)).await.map_err(|e| {
                    Error::from_engine(e, |source| Error::Import {
                        filename: filename.to_string(),
                        source,
                    })
                })
            })
            .await?;

        if acks.len() != 1 {
            return Err(Error::PartialImport {
                filename: filename.to_string(),
                acknowledged: acks.len(),
                detail: None,
            });
        }
        let errors = acks[0].errors();
        if !errors.is_empty() {
            return Err(Error::PartialImport {
                filename: filename.to_string(),
                acknowledged: 1,
                detail: Some(errors.join("; ")),
            });
        }
        Ok(())
    }
}

/// 列出目录下的普通文件，同时返回跳过的目录项数量
fn list_files(dir: &Path) -> Result<(Vec<PathBuf>, usize)> {
    let mut files = vec![];
    let mut skipped = 0;
    let walker = WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true);
    for entry in walker.sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            Error::io(path, e.into())
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        } else {
            skipped += 1;
        }
    }
    Ok((files, skipped))
}

/// 文件名作为元数据保存，不是有效 UTF-8 的部分会被替换为 U+FFFD
fn file_name(path: &Path) -> String {
    let name = path.file_name().unwrap_or_default();
    match name.to_str() {
        Some(name) => name.to_string(),
        None => {
            let lossy = name.to_string_lossy().into_owned();
            warn!("文件名不是有效的 UTF-8，将保存为 {lossy:?}: {}", path.display());
            lossy
        }
    }
}
