use std::path::{Path, PathBuf};

use log::warn;
use uuid::Uuid;

use crate::error::{Error, Result};

/// 上传图片暂存文件的后缀
const UPLOAD_EXTENSION: &str = "jpg";

/// 暂存的上传图片，离开作用域时删除
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    /// 在 `dir` 下以随机的唯一文件名写入 `data`
    pub async fn create(dir: &Path, data: &[u8]) -> Result<Self> {
        let path = dir.join(format!("{}.{UPLOAD_EXTENSION}", Uuid::new_v4()));
        // 先构造守卫，写入失败时残留的文件同样会被清理
        let upload = Self { path };
        tokio::fs::write(&upload.path, data).await.map_err(|e| Error::io(&upload.path, e))?;
        Ok(upload)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        // drop 中不能 await，单个文件的 unlink 直接在当前线程同步执行
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("删除临时文件 {} 失败: {e}", self.path.display());
            }
        }
    }
}
