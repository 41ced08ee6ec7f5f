use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 错误响应
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// 错误类别，例如 `query`、`decode`、`io`
    pub kind: String,
    /// 错误信息
    pub message: String,
}
