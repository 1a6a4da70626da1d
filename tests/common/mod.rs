pub mod fixtures;

use serde_json::Value;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Transforms with a template given as a JSON value.
pub fn shape(xml: &str, template: Value) -> Value {
    init_logs();
    xmlshape::transform_value(xml, &template).expect("template should be valid")
}

/// Keys of an output object, in output order.
pub fn keys(value: &Value) -> Vec<&str> {
    value
        .as_object()
        .map(|map| map.keys().map(String::as_str).collect())
        .unwrap_or_default()
}
