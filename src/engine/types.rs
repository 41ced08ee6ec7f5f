use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 批量写入中的单个对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchObject {
    /// 目标集合名
    pub class: String,
    /// 对象字段
    pub properties: Value,
}

/// 批量写入请求体
#[derive(Debug, Serialize)]
pub(crate) struct BatchRequest<'a> {
    pub objects: &'a [BatchObject],
}

/// 引擎对单个对象的写入确认
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectAck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AckResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AckResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<AckErrors>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AckErrors {
    #[serde(default)]
    pub error: Vec<AckError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AckError {
    pub message: String,
}

impl ObjectAck {
    /// 构造一条带错误的确认
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            id: None,
            result: Some(AckResult {
                errors: Some(AckErrors { error: vec![AckError { message: message.into() }] }),
            }),
        }
    }

    /// 确认中携带的错误信息
    pub fn errors(&self) -> Vec<&str> {
        self.result
            .iter()
            .flat_map(|r| r.errors.iter())
            .flat_map(|e| e.error.iter())
            .map(|e| e.message.as_str())
            .collect()
    }
}

/// 以图搜图的查询参数
#[derive(Debug, Clone, Copy)]
pub struct NearImageQuery<'a> {
    /// 目标集合名
    pub class: &'a str,
    /// base64 编码的图片
    pub image: &'a str,
    /// 返回的最大结果数量
    pub limit: usize,
    /// 需要返回的字段
    pub fields: &'a [&'a str],
}
