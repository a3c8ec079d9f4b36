pub mod fixtures;

use pathq::{JPathError, JsonPath};
use serde_json::Value;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Route engine logging through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Run `expression` and fail on any error, including aborted queries.
pub fn query(document: &Value, expression: &str) -> Result<Vec<Value>, JPathError> {
    init_logging();
    JsonPath::new(document, expression).try_evaluate()
}

/// Collect the string field `field` from every result object.
pub fn strings_of<'a>(results: &'a [Value], field: &str) -> Vec<&'a str> {
    results.iter().filter_map(|v| v[field].as_str()).collect()
}
