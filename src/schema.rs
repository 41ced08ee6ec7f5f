use std::collections::BTreeMap;
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::engine::VectorEngine;
use crate::error::{Error, Result};

/// 集合名称
pub const COLLECTION_NAME: &str = "MultiModal";

/// 用于生成向量的模块
pub const VECTORIZER: &str = "img2vec-neural";

/// 字段的语义类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Text,
    Blob,
}

/// 集合中的一个字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    pub data_type: Vec<DataType>,
    pub description: String,
}

/// 向量化模块的配置，声明哪些字段参与生成向量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    pub image_fields: Vec<String>,
}

/// 集合定义，序列化后即为引擎接受的 class 结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSchema {
    pub class: String,
    pub description: String,
    pub vectorizer: String,
    pub vector_index_type: String,
    pub module_config: BTreeMap<String, ModuleConfig>,
    pub properties: Vec<Property>,
}

impl CollectionSchema {
    /// 本系统使用的固定集合：文件名 + 参与向量化的图片
    pub fn images() -> Self {
        let module = ModuleConfig { image_fields: vec!["image".to_string()] };
        Self {
            class: COLLECTION_NAME.to_string(),
            description: "Sample class holding all the images".to_string(),
            vectorizer: VECTORIZER.to_string(),
            vector_index_type: "hnsw".to_string(),
            module_config: BTreeMap::from([(VECTORIZER.to_string(), module)]),
            properties: vec![
                Property {
                    name: "filename".to_string(),
                    data_type: vec![DataType::Text],
                    description: "The name of the file".to_string(),
                },
                Property {
                    name: "image".to_string(),
                    data_type: vec![DataType::Blob],
                    description: "Base64 encoded image".to_string(),
                },
            ],
        }
    }
}

/// 管理集合的创建与删除
#[derive(Clone)]
pub struct SchemaManager {
    engine: Arc<dyn VectorEngine>,
    schema: CollectionSchema,
}

impl SchemaManager {
    pub fn new(engine: Arc<dyn VectorEngine>) -> Self {
        Self::with_schema(engine, CollectionSchema::images())
    }

    pub fn with_schema(engine: Arc<dyn VectorEngine>, schema: CollectionSchema) -> Self {
        Self { engine, schema }
    }

    pub fn schema(&self) -> &CollectionSchema {
        &self.schema
    }

    /// 确保集合不存在，集合中的所有对象随之删除
    pub async fn delete_collection(&self, ctx: &Context) -> Result<()> {
        let name = &self.schema.class;
        let result = ctx
            .run(async {
                self.engine
                    .delete_collection(name)
                    .await
                    .map_err(|e| Error::from_engine(e, Error::Schema))
            })
            .await;
        match result {
            Ok(()) => {
                info!("已删除集合 {name}");
                Ok(())
            }
            Err(Error::Schema(e)) if e.status() == Some(404) => {
                info!("集合 {name} 不存在，无需删除");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// 创建集合，集合已存在或引擎拒绝定义时返回 [`Error::Schema`]
    pub async fn create_collection(&self, ctx: &Context) -> Result<()> {
        ctx.run(async {
            self.engine
                .create_collection(&self.schema)
                .await
                .map_err(|e| Error::from_engine(e, Error::Schema))
        })
        .await?;
        info!("已创建集合 {}", self.schema.class);
        Ok(())
    }

    /// 删除并重建集合
    pub async fn reset_collection(&self, ctx: &Context) -> Result<()> {
        if let Err(e) = self.delete_collection(ctx).await {
            warn!("删除集合失败: {e}");
            return Err(e);
        }
        self.create_collection(ctx).await
    }
}
