//! A JSONPath query engine over `serde_json` documents.
//!
//! An expression such as `$.store.book[?(@.price < 10)].title` is tokenized into a list of
//! segments (filters are compiled into predicate trees up front) and then evaluated by
//! folding a node set through those segments. Results are owned copies, so nothing a caller
//! does to them can reach the source document.
//!
//! ```
//! use pathq_jpath::evaluate;
//! use serde_json::json;
//!
//! let data = json!({ "key1": [{ "size": "S" }, { "size": "M" }, { "size": "L" }] });
//! let result = evaluate(&data, "$.key1[?(@.size in ['S','M'])]").unwrap();
//! assert_eq!(result, vec![json!({ "size": "S" }), json!({ "size": "M" })]);
//! ```

pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod functions;
mod parser;
pub mod value;

// --- Public API ---
pub use ast::{CompareOp, Operand, PathStep, Pattern, Predicate, RelativePath, Segment, SetOp};
pub use config::{DEFAULT_MAX_DEPTH, EngineConfig};
pub use engine::{EvaluationContext, JsonPath, evaluate, evaluate_segments};
pub use error::JPathError;
pub use filter::{compile_filter, compile_filter_with};
pub use functions::Function;
pub use parser::{parse_path, parse_path_with};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_and_eval_simple_path() {
        let data = json!({ "customer": { "name": "ACME" } });
        let result = evaluate(&data, "$.customer.name").unwrap();
        assert_eq!(result, vec![json!("ACME")]);
    }

    #[test]
    fn test_parse_and_eval_path_with_index() {
        let data = json!({ "orders": [ { "id": "A" }, { "id": "B" } ] });
        let result = evaluate(&data, "$.orders[1].id").unwrap();
        assert_eq!(result, vec![json!("B")]);
    }

    #[test]
    fn test_parse_then_evaluate_segments() {
        let data = json!({ "prices": [3, 1, 2] });
        let segments = parse_path("$.prices.max()").unwrap();
        let config = EngineConfig::default();
        let e_ctx = EvaluationContext {
            document: &data,
            config: &config,
        };
        let result = evaluate_segments(&segments, &e_ctx).unwrap();
        assert_eq!(result, vec![json!(3)]);
    }

    #[test]
    fn test_slices_from_the_end() {
        let data = json!({ "key": [1, 2, 3, 0] });
        assert_eq!(evaluate(&data, "$.key[1:3]").unwrap(), vec![json!(2), json!(3)]);
        assert_eq!(evaluate(&data, "$.key[-1:]").unwrap(), vec![json!(0)]);
    }

    #[test]
    fn test_bad_filter_yields_nothing() {
        let data = json!({ "key": [1, 2, 3] });
        assert!(evaluate(&data, "$.key[?(@ >< 1)]").unwrap().is_empty());
    }
}
