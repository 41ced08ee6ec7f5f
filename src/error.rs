use std::path::PathBuf;

use thiserror::Error;

use crate::engine::EngineError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 编排层的错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// 集合的创建或删除被引擎拒绝
    #[error("集合操作失败: {0}")]
    Schema(#[source] EngineError),
    /// 本地文件读写失败
    #[error("读写文件 {} 失败: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 批量写入的确认数量不为 1，或者确认中带有错误
    #[error("图片 {filename} 导入不完整: 收到 {acknowledged} 条确认{}", detail_suffix(.detail))]
    PartialImport { filename: String, acknowledged: usize, detail: Option<String> },
    /// 批量写入请求本身失败
    #[error("图片 {filename} 写入失败: {source}")]
    Import {
        filename: String,
        #[source]
        source: EngineError,
    },
    /// 引擎响应的结构不符合约定
    #[error("无法解析引擎响应: {0}")]
    Decode(String),
    /// 相似度查询失败
    #[error("相似度查询失败: {0}")]
    Query(#[source] EngineError),
    /// 上下文被取消或超时
    #[error("操作已取消")]
    Cancelled,
}

impl Error {
    /// 机器可读的错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Schema(_) => "schema",
            Self::Io { .. } => "io",
            Self::PartialImport { .. } => "partial_import",
            Self::Import { .. } => "import",
            Self::Decode(_) => "decode",
            Self::Query(_) => "query",
            Self::Cancelled => "cancelled",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// 将引擎错误归类：超时视为取消，响应格式错误视为解码错误，其余交给 `wrap`
    pub(crate) fn from_engine(err: EngineError, wrap: impl FnOnce(EngineError) -> Self) -> Self {
        match err {
            EngineError::Timeout => Self::Cancelled,
            EngineError::Malformed(msg) => Self::Decode(msg),
            err => wrap(err),
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!("（{detail}）"),
        None => String::new(),
    }
}
