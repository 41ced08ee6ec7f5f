//! 图片在传输时使用的编码

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

/// 标准 base64（带填充）编码
pub fn to_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// 解码引擎返回的图片字段
pub fn from_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(|e| Error::Decode(format!("图片字段不是合法的 base64: {e}")))
}

/// 读取文件并编码
pub async fn read_base64(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let data = tokio::fs::read(path).await.map_err(|e| Error::io(path, e))?;
    Ok(to_base64(&data))
}
