use std::collections::{BTreeSet, HashMap};
use std::future::pending;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{BatchObject, EngineError, NearImageQuery, ObjectAck, VectorEngine};
use crate::schema::CollectionSchema;

/// 测试用的内存引擎
///
/// 查询结果按写入顺序返回，与输入图片完全相同的对象排在最前面。
#[derive(Default)]
pub(crate) struct MockEngine {
    state: Mutex<State>,
    unreachable: bool,
    hanging: bool,
    hang_at: Option<usize>,
    acks: HashMap<usize, Vec<ObjectAck>>,
    response: Option<Value>,
}

#[derive(Default)]
struct State {
    collections: BTreeSet<String>,
    objects: Vec<BatchObject>,
    batch_calls: usize,
    queries: usize,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预先创建集合
    pub fn with_collection(self, name: &str) -> Self {
        self.state.lock().unwrap().collections.insert(name.to_string());
        self
    }

    /// 所有请求都返回 503
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// 所有请求都不会返回
    pub fn hanging(mut self) -> Self {
        self.hanging = true;
        self
    }

    /// 第 `call` 次（从 0 开始）批量写入不会返回，之前的写入正常保存
    pub fn hang_at(mut self, call: usize) -> Self {
        self.hang_at = Some(call);
        self
    }

    /// 第 `call` 次（从 0 开始）批量写入返回指定的确认，对象不会被保存
    pub fn with_acks(mut self, call: usize, acks: Vec<ObjectAck>) -> Self {
        self.acks.insert(call, acks);
        self
    }

    /// 查询时直接返回该响应
    pub fn with_response(mut self, response: Value) -> Self {
        self.response = Some(response);
        self
    }

    pub fn insert(&self, class: &str, filename: &str, image: &str) {
        self.state.lock().unwrap().objects.push(BatchObject {
            class: class.to_string(),
            properties: json!({ "filename": filename, "image": image }),
        });
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.state.lock().unwrap().collections.contains(name)
    }

    pub fn object_count(&self) -> usize {
        self.state.lock().unwrap().objects.len()
    }

    pub fn batch_calls(&self) -> usize {
        self.state.lock().unwrap().batch_calls
    }

    pub fn queries(&self) -> usize {
        self.state.lock().unwrap().queries
    }

    /// 已保存对象的文件名，按写入顺序
    pub fn filenames(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .objects
            .iter()
            .map(|o| o.properties["filename"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    async fn check(&self) -> Result<(), EngineError> {
        if self.hanging {
            pending::<()>().await;
        }
        if self.unreachable {
            return Err(EngineError::Status { status: 503, body: "unavailable".into() });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorEngine for MockEngine {
    async fn delete_collection(&self, name: &str) -> Result<(), EngineError> {
        self.check().await?;
        let mut state = self.state.lock().unwrap();
        if !state.collections.remove(name) {
            return Err(EngineError::Status { status: 404, body: String::new() });
        }
        state.objects.retain(|o| o.class != name);
        Ok(())
    }

    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), EngineError> {
        self.check().await?;
        let mut state = self.state.lock().unwrap();
        if !state.collections.insert(schema.class.clone()) {
            return Err(EngineError::Status {
                status: 422,
                body: format!("class name {:?} already exists", schema.class),
            });
        }
        Ok(())
    }

    async fn batch_objects(&self, objects: &[BatchObject]) -> Result<Vec<ObjectAck>, EngineError> {
        self.check().await?;
        let call = {
            let mut state = self.state.lock().unwrap();
            state.batch_calls += 1;
            state.batch_calls - 1
        };
        if self.hang_at == Some(call) {
            pending::<()>().await;
        }
        let mut state = self.state.lock().unwrap();
        if let Some(acks) = self.acks.get(&call) {
            return Ok(acks.clone());
        }
        let mut acks = vec![];
        for object in objects {
            if !state.collections.contains(&object.class) {
                return Err(EngineError::Status {
                    status: 422,
                    body: format!("class {:?} not found", object.class),
                });
            }
            state.objects.push(object.clone());
            acks.push(ObjectAck { id: Some(format!("obj-{}", state.objects.len())), result: None });
        }
        Ok(acks)
    }

    async fn near_image(&self, query: &NearImageQuery<'_>) -> Result<Value, EngineError> {
        self.check().await?;
        let mut state = self.state.lock().unwrap();
        state.queries += 1;
        if let Some(response) = &self.response {
            return Ok(response.clone());
        }
        if !state.collections.contains(query.class) {
            return Ok(json!({
                "data": { "Get": { query.class: null } },
                "errors": [{ "message": format!("Cannot query field {:?} on type \"GetObjectsObj\".", query.class) }],
            }));
        }
        let mut matches: Vec<&BatchObject> =
            state.objects.iter().filter(|o| o.class == query.class).collect();
        matches.sort_by_key(|o| o.properties["image"] != query.image);
        let matches: Vec<Value> = matches
            .into_iter()
            .take(query.limit)
            .map(|o| {
                let fields: serde_json::Map<String, Value> = query
                    .fields
                    .iter()
                    .map(|f| (f.to_string(), o.properties[*f].clone()))
                    .collect();
                Value::Object(fields)
            })
            .collect();
        Ok(json!({ "data": { "Get": { query.class: matches } } }))
    }
}
