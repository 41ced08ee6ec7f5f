use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::Context;
use crate::encode;
use crate::engine::{EngineError, NearImageQuery, VectorEngine};
use crate::error::{Error, Result};
use crate::schema::COLLECTION_NAME;

/// 每次查询返回的结果数量
pub const RESULT_LIMIT: usize = 16;

/// 查询返回的字段
const RESULT_FIELD: &str = "image";

/// 固定长度的查询结果，匹配数量不足时以空字符串补齐
pub type SearchResult = [String; RESULT_LIMIT];

/// 按相似度从高到低排列的查询结果，长度为实际匹配数量
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultSet(Vec<String>);

impl ResultSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// 转换为固定长度的结果，多余的位置为空字符串
    pub fn padded(self) -> SearchResult {
        let mut result = SearchResult::default();
        for (slot, image) in result.iter_mut().zip(self.0) {
            *slot = image;
        }
        result
    }
}

impl From<Vec<String>> for ResultSet {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<GetData>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GetData {
    #[serde(rename = "Get")]
    get: HashMap<String, Option<Vec<Match>>>,
}

#[derive(Deserialize)]
struct Match {
    image: String,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// 以图搜图
#[derive(Clone)]
pub struct QueryPipeline {
    engine: Arc<dyn VectorEngine>,
    class: String,
}

impl QueryPipeline {
    pub fn new(engine: Arc<dyn VectorEngine>) -> Self {
        Self { engine, class: COLLECTION_NAME.to_string() }
    }

    /// 搜索与 `path` 处图片最相似的 16 张图片
    pub async fn search_by_image(&self, ctx: &Context, path: impl AsRef<Path>) -> Result<SearchResult> {
        Ok(self.search_ranked(ctx, path).await?.padded())
    }

    /// 与 [`Self::search_by_image`] 相同，但返回实际的匹配数量
    pub async fn search_ranked(&self, ctx: &Context, path: impl AsRef<Path>) -> Result<ResultSet> {
        let image = encode::read_base64(path).await?;
        self.search_encoded(ctx, &image).await
    }

    /// 搜索内存中的图片
    pub async fn search_bytes(&self, ctx: &Context, data: &[u8]) -> Result<ResultSet> {
        self.search_encoded(ctx, &encode::to_base64(data)).await
    }

    async fn search_encoded(&self, ctx: &Context, image: &str) -> Result<ResultSet> {
        let query = NearImageQuery {
            class: &self.class,
            image,
            limit: RESULT_LIMIT,
            fields: &[RESULT_FIELD],
        };
        let response = ctx
            .run(async {
                self.engine.near_image(&query).await.map_err(|e| Error::from_engine(e, Error::Query))
            })
            .await?;
        let result = decode_matches(response, &self.class, RESULT_LIMIT)?;
        debug!("找到 {} 张相似图片", result.len());
        Ok(result)
    }
}

/// 将引擎的嵌套响应解析为有序的结果
fn decode_matches(response: Value, class: &str, limit: usize) -> Result<ResultSet> {
    let response: GraphQlResponse =
        serde_json::from_value(response).map_err(|e| Error::Decode(e.to_string()))?;

    if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
        let message = errors.into_iter().map(|e| e.message).collect::<Vec<_>>().join("; ");
        return Err(Error::Query(EngineError::Rejected(message)));
    }

    let mut data = response.data.ok_or_else(|| Error::Decode("响应缺少 data 字段".into()))?;
    let matches = data
        .get
        .remove(class)
        .ok_or_else(|| Error::Decode(format!("响应缺少 Get.{class} 字段")))?
        .ok_or_else(|| Error::Decode(format!("Get.{class} 字段为空")))?;

    if matches.len() > limit {
        return Err(Error::Decode(format!("返回了 {} 条结果，超过了上限 {limit}", matches.len())));
    }

    Ok(ResultSet(matches.into_iter().map(|m| m.image).collect()))
}
