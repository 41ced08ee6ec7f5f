use std::future::{Future, pending};
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// 一次引擎操作的上下文：取消令牌加上可选的截止时间
///
/// 所有访问引擎的操作都接收一个上下文，取消或超时后返回 [`Error::Cancelled`]。
/// 已经提交给引擎的写入不会被回滚。
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用外部的取消令牌创建上下文
    pub fn with_token(token: CancellationToken) -> Self {
        Self { token, deadline: None }
    }

    /// 设置从现在开始计算的超时时间
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// 派生子上下文，父上下文取消时子上下文一并取消，反之不会
    pub fn child(&self) -> Self {
        Self { token: self.token.child_token(), deadline: self.deadline }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// 在上下文中执行 `fut`，取消或超时时丢弃它并返回 [`Error::Cancelled`]
    pub async fn run<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let deadline = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Error::Cancelled),
            _ = deadline => Err(Error::Cancelled),
            result = fut => result,
        }
    }
}
