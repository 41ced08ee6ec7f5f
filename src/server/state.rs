use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::context::Context;
use crate::engine::VectorEngine;
use crate::query::QueryPipeline;

/// 应用状态
pub struct AppState {
    /// 以图搜图
    pub pipeline: QueryPipeline,
    /// 上传图片的暂存目录
    pub static_dir: PathBuf,
    /// 单个请求的超时时间
    pub timeout: Duration,
    /// 所有请求上下文的父上下文，服务关闭时取消
    root: Context,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(
        engine: Arc<dyn VectorEngine>,
        static_dir: impl Into<PathBuf>,
        timeout: Duration,
        shutdown: CancellationToken,
    ) -> Arc<Self> {
        Arc::new(AppState {
            pipeline: QueryPipeline::new(engine),
            static_dir: static_dir.into(),
            timeout,
            root: Context::with_token(shutdown),
        })
    }

    /// 为单个请求创建上下文
    pub fn context(&self) -> Context {
        self.root.child().with_timeout(self.timeout)
    }
}
