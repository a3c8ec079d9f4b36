//! `pathq`: run JSONPath expressions against JSON documents.
//!
//! The query engine lives in the `pathq-jpath` crate and is re-exported here, together with
//! the helpers the command-line tool is built from.

pub mod error;

pub use error::CliError;
pub use pathq_jpath::{
    DEFAULT_MAX_DEPTH, EngineConfig, Function, JPathError, JsonPath, Segment, evaluate,
    parse_path,
};

use serde_json::Value;
use std::io::Read;

/// Reads and parses a whole JSON document from `reader`.
pub fn read_document(mut reader: impl Read) -> Result<Value, CliError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(serde_json::from_str(&text)?)
}

/// Serializes each match on its own, pretty-printed unless `compact` keeps every match
/// on a single line.
pub fn render_results(results: &[Value], compact: bool) -> Result<String, CliError> {
    let rendered = results
        .iter()
        .map(|value| {
            if compact {
                serde_json::to_string(value)
            } else {
                serde_json::to_string_pretty(value)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rendered.join("\n"))
}
