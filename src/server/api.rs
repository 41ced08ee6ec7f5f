use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::header;
use axum::response::IntoResponse;
use log::{info, warn};

use super::error::{AppError, Result};
use super::state::AppState;
use super::upload::TempUpload;
use crate::metrics;
use crate::query::SearchResult;

/// 健康检查
#[utoipa::path(
    get,
    path = "/ping",
    responses(
        (status = 200, body = String, example = json!("pong")),
    )
)]
pub async fn ping_handler() -> Json<&'static str> {
    Json("pong")
}

/// 搜索一张图片
///
/// 请求体为原始图片数据，返回 16 个按相似度排列的 base64 图片，不足时以空字符串补齐
#[utoipa::path(
    post,
    path = "/search/image",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, body = Vec<String>),
        (status = 400, body = super::types::ErrorResponse),
        (status = 500, body = super::types::ErrorResponse),
    )
)]
pub async fn search_image_handler(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<SearchResult>> {
    let body = body.map_err(AppError::from_rejection)?;

    let start = Instant::now();
    let upload = TempUpload::create(&state.static_dir, &body).await?;
    info!("正在搜索上传图片: {} ({} 字节)", upload.path().display(), body.len());

    let result = state.pipeline.search_by_image(&state.context(), upload.path()).await;
    metrics::inc_search_duration(start.elapsed().as_secs_f32());

    match result {
        Ok(result) => {
            metrics::inc_search_count("ok");
            Ok(Json(result))
        }
        Err(e) => {
            warn!("搜索失败: {e}");
            metrics::inc_search_count(e.kind());
            Err(e.into())
        }
    }
}

/// 导出 Prometheus 指标
#[utoipa::path(get, path = "/metrics", responses((status = 200, body = String)))]
pub async fn metrics_handler() -> Result<impl IntoResponse> {
    let body = metrics::gather().map_err(anyhow::Error::from)?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
