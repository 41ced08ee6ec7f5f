use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::{BatchObject, BatchRequest, EngineError, NearImageQuery, ObjectAck, VectorEngine};
use crate::schema::CollectionSchema;

/// Weaviate REST/GraphQL 客户端
///
/// 内部的 [`Client`] 是一个连接池句柄，克隆开销很小，可以在请求之间共享。
#[derive(Debug, Clone)]
pub struct WeaviateClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeaviateClient {
    /// 创建客户端
    ///
    /// # Arguments
    ///
    /// * `base_url` - 引擎地址，例如 `http://localhost:8080`
    /// * `api_key` - 可选的 API key，以 Bearer token 发送
    /// * `timeout` - 单次请求超时时间
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url, api_key })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, EngineError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(EngineError::Status { status: status.as_u16(), body })
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, EngineError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| EngineError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl VectorEngine for WeaviateClient {
    async fn delete_collection(&self, name: &str) -> Result<(), EngineError> {
        debug!("删除集合 {name}");
        self.send(self.request(Method::DELETE, &format!("/v1/schema/{name}"))).await?;
        Ok(())
    }

    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), EngineError> {
        debug!("创建集合 {}", schema.class);
        self.send(self.request(Method::POST, "/v1/schema").json(schema)).await?;
        Ok(())
    }

    async fn batch_objects(&self, objects: &[BatchObject]) -> Result<Vec<ObjectAck>, EngineError> {
        let body = BatchRequest { objects };
        let response = self.send(self.request(Method::POST, "/v1/batch/objects").json(&body)).await?;
        Self::json(response).await
    }

    async fn near_image(&self, query: &NearImageQuery<'_>) -> Result<Value, EngineError> {
        let body = json!({ "query": near_image_graphql(query) });
        let response = match self.send(self.request(Method::POST, "/v1/graphql").json(&body)).await
        {
            Ok(response) => response,
            // GraphQL 错误也可能以 422 返回，此时响应体同样是标准的 GraphQL 结构
            Err(EngineError::Status { status, body })
                if status == StatusCode::UNPROCESSABLE_ENTITY.as_u16() =>
            {
                return serde_json::from_str(&body)
                    .map_err(|_| EngineError::Status { status, body });
            }
            Err(e) => return Err(e),
        };
        Self::json(response).await
    }
}

/// 构造 `Get` + `nearImage` 查询语句
fn near_image_graphql(query: &NearImageQuery<'_>) -> String {
    // JSON 字符串字面量同时也是合法的 GraphQL 字符串字面量
    let image = Value::String(query.image.to_string());
    format!(
        "{{ Get {{ {}(nearImage: {{image: {}}}, limit: {}) {{ {} }} }} }}",
        query.class,
        image,
        query.limit,
        query.fields.join(" ")
    )
}
