//! 外部向量搜索引擎的边界
//!
//! 编排层只通过 [`VectorEngine`] 访问引擎，默认实现为 Weaviate 的 REST/GraphQL 接口。

mod types;
mod weaviate;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::schema::CollectionSchema;

pub use self::types::*;
pub use self::weaviate::WeaviateClient;

/// 引擎边界上的错误
#[derive(Debug, Error)]
pub enum EngineError {
    /// 网络层面的失败
    #[error("请求引擎失败: {0}")]
    Transport(#[source] reqwest::Error),
    /// 引擎返回了非成功状态码
    #[error("引擎返回状态 {status}: {body}")]
    Status { status: u16, body: String },
    /// 引擎在成功响应中报告了错误
    #[error("引擎拒绝了请求: {0}")]
    Rejected(String),
    /// 响应体无法解析
    #[error("{0}")]
    Malformed(String),
    /// 请求超时
    #[error("请求引擎超时")]
    Timeout,
}

impl EngineError {
    /// 引擎返回的 HTTP 状态码
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { Self::Timeout } else { Self::Transport(err) }
    }
}

/// 向量搜索引擎客户端
///
/// 实现必须可以在多个请求之间并发共享。
#[async_trait]
pub trait VectorEngine: Send + Sync {
    /// 删除集合，集合不存在时引擎可能返回 404
    async fn delete_collection(&self, name: &str) -> Result<(), EngineError>;

    /// 按给定结构创建集合
    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), EngineError>;

    /// 批量写入对象，返回每个对象的确认
    async fn batch_objects(&self, objects: &[BatchObject]) -> Result<Vec<ObjectAck>, EngineError>;

    /// 以图搜图，返回引擎原始的嵌套响应
    async fn near_image(&self, query: &NearImageQuery<'_>) -> Result<Value, EngineError>;
}
