//! 测试用的 Weaviate 替身，只实现本项目用到的接口
//!
//! 查询时与输入图片完全相同的对象排在最前面，其余按写入顺序排列。

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::thread;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde_json::{Value, json};

type Classes = Arc<Mutex<BTreeMap<String, Vec<Value>>>>;

pub struct FakeWeaviate {
    addr: SocketAddr,
    classes: Classes,
}

impl FakeWeaviate {
    /// 在后台线程中启动服务
    pub fn spawn() -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();

        let classes = Classes::default();
        let app = Router::new()
            .route("/v1/schema", post(create_class))
            .route("/v1/schema/{class}", delete(delete_class))
            .route("/v1/batch/objects", post(batch_objects))
            .route("/v1/graphql", post(graphql))
            .with_state(classes.clone());

        thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });

        Self { addr, classes }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.lock().unwrap().contains_key(class)
    }

    pub fn object_count(&self, class: &str) -> usize {
        self.classes.lock().unwrap().get(class).map_or(0, Vec::len)
    }
}

async fn create_class(State(classes): State<Classes>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let Some(class) = body["class"].as_str() else {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(error("class is required")));
    };
    let mut classes = classes.lock().unwrap();
    if classes.contains_key(class) {
        let message = format!("class name {class:?} already exists");
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(error(&message)));
    }
    classes.insert(class.to_string(), vec![]);
    (StatusCode::OK, Json(body))
}

async fn delete_class(State(classes): State<Classes>, Path(class): Path<String>) -> StatusCode {
    classes.lock().unwrap().remove(&class);
    StatusCode::OK
}

async fn batch_objects(State(classes): State<Classes>, Json(body): Json<Value>) -> Json<Value> {
    let mut classes = classes.lock().unwrap();
    let objects = body["objects"].as_array().cloned().unwrap_or_default();
    let acks: Vec<Value> = objects
        .into_iter()
        .map(|object| {
            let class = object["class"].as_str().unwrap_or_default();
            match classes.get_mut(class) {
                Some(objects) => {
                    objects.push(object["properties"].clone());
                    json!({ "id": format!("{:08}", objects.len()), "result": {} })
                }
                None => json!({
                    "result": { "errors": { "error": [{ "message": format!("class {class:?} not found") }] } }
                }),
            }
        })
        .collect();
    Json(Value::Array(acks))
}

async fn graphql(State(classes): State<Classes>, Json(body): Json<Value>) -> Json<Value> {
    let query = body["query"].as_str().unwrap_or_default();
    let class = between(query, "Get { ", "(");
    let image = between(query, "image: \"", "\"");
    let limit: usize = between(query, "limit: ", ")").parse().unwrap_or(10);
    let fields: Vec<&str> = between(query, ") { ", " }").split_whitespace().collect();

    let classes = classes.lock().unwrap();
    let Some(objects) = classes.get(class) else {
        let message = format!("Cannot query field {class:?} on type \"GetObjectsObj\".");
        return Json(json!({ "data": { "Get": { class: null } }, "errors": [{ "message": message }] }));
    };
    if image.is_empty() {
        return Json(json!({
            "data": { "Get": { class: null } },
            "errors": [{ "message": "could not vectorize image" }],
        }));
    }

    let mut matches: Vec<&Value> = objects.iter().collect();
    matches.sort_by_key(|o| o["image"] != image);
    let matches: Vec<Value> = matches
        .into_iter()
        .take(limit)
        .map(|o| fields.iter().map(|f| (f.to_string(), o[*f].clone())).collect())
        .collect();
    Json(json!({ "data": { "Get": { class: matches } } }))
}

fn error(message: &str) -> Value {
    json!({ "error": [{ "message": message }] })
}

fn between<'a>(s: &'a str, start: &str, end: &str) -> &'a str {
    s.split_once(start)
        .and_then(|(_, rest)| rest.split_once(end))
        .map(|(value, _)| value)
        .unwrap_or_default()
}
