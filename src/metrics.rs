use std::sync::LazyLock;

use prometheus::*;

static METRIC_SEARCH_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!("imquery_search_count", "count of the image to search", &["outcome"])
        .unwrap()
});

static METRIC_SEARCH_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    register_histogram!("imquery_search_duration", "duration of the per-image search in seconds")
        .unwrap()
});

static METRIC_IMPORT_COUNT: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!("imquery_import_count", "count of the imported images").unwrap()
});

/// 记录一次搜索，`outcome` 为 `ok` 或错误类别
pub fn inc_search_count(outcome: &str) {
    METRIC_SEARCH_COUNT.with_label_values(&[outcome]).inc();
}

pub fn inc_search_duration(duration: f32) {
    METRIC_SEARCH_DURATION.observe(duration as f64);
}

pub fn inc_import_count() {
    METRIC_IMPORT_COUNT.inc();
}

/// 以文本格式导出所有指标
pub fn gather() -> Result<String> {
    let mut buffer = String::new();
    TextEncoder::new().encode_utf8(&prometheus::gather(), &mut buffer)?;
    Ok(buffer)
}
