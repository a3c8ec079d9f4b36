//! The evaluation engine: folds a node set through a parsed segment list.

use super::ast::{CompareOp, Operand, Predicate, Segment, SetOp};
use super::value::{compare_values, contains, is_truthy, same_type, size_of, values_equal};
use crate::config::EngineConfig;
use crate::error::JPathError;
use crate::parser::parse_path_with;
use serde_json::Value;
use std::cmp::Ordering;

/// A query bound to the document it runs against.
///
/// ```
/// use pathq_jpath::JsonPath;
/// use serde_json::json;
///
/// let data = json!({ "key": [1, 2, 3, 0] });
/// let result = JsonPath::new(&data, "$.key[1:3]").evaluate().unwrap();
/// assert_eq!(result, vec![json!(2), json!(3)]);
/// ```
#[derive(Debug, Clone)]
pub struct JsonPath<'d> {
    document: &'d Value,
    expression: String,
    config: EngineConfig,
}

impl<'d> JsonPath<'d> {
    pub fn new(document: &'d Value, expression: impl Into<String>) -> Self {
        Self {
            document,
            expression: expression.into(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Runs the query.
    ///
    /// Only a malformed expression is reported as an error. A query that aborts part way
    /// (bad filter, index out of range, ...) is logged and yields an empty result.
    pub fn evaluate(&self) -> Result<Vec<Value>, JPathError> {
        self.check_expression()?;
        match self.run() {
            Ok(nodes) => Ok(nodes),
            Err(e) => {
                log::warn!("JSONPath query '{}' aborted: {}", self.expression, e);
                Ok(Vec::new())
            }
        }
    }

    /// Runs the query, returning every failure to the caller instead of logging it.
    pub fn try_evaluate(&self) -> Result<Vec<Value>, JPathError> {
        self.check_expression()?;
        self.run()
    }

    fn check_expression(&self) -> Result<(), JPathError> {
        if self.expression.starts_with('$') {
            Ok(())
        } else {
            Err(JPathError::MalformedQuery(self.expression.clone()))
        }
    }

    fn run(&self) -> Result<Vec<Value>, JPathError> {
        let segments = parse_path_with(&self.expression, &self.config)?;
        log::debug!(
            "Parsed '{}' into {} segments",
            self.expression,
            segments.len()
        );
        let e_ctx = EvaluationContext {
            document: self.document,
            config: &self.config,
        };
        evaluate_segments(&segments, &e_ctx)
    }
}

/// Runs `expression` against `document` with the default configuration.
pub fn evaluate(document: &Value, expression: &str) -> Result<Vec<Value>, JPathError> {
    JsonPath::new(document, expression).evaluate()
}

/// State shared by every step of one evaluation.
pub struct EvaluationContext<'d> {
    /// The whole document, for `$` and sub-queries.
    pub document: &'d Value,
    pub config: &'d EngineConfig,
}

/// Folds an empty node set through `segments`.
pub fn evaluate_segments(
    segments: &[Segment],
    e_ctx: &EvaluationContext<'_>,
) -> Result<Vec<Value>, JPathError> {
    let mut nodes = Vec::new();
    for segment in segments {
        nodes = apply_segment(segment, nodes, e_ctx)?;
        log::debug!("{:?} -> {} nodes", segment, nodes.len());
    }
    Ok(nodes)
}

fn apply_segment(
    segment: &Segment,
    nodes: Vec<Value>,
    e_ctx: &EvaluationContext<'_>,
) -> Result<Vec<Value>, JPathError> {
    match segment {
        // A deep copy, so callers can never reach the source document through the result.
        Segment::Root => Ok(vec![e_ctx.document.clone()]),
        Segment::Current => Ok(nodes),
        Segment::DotKey(key) | Segment::BracketKey(key) => Ok(select_key(nodes, key)),
        Segment::DotWildcard | Segment::Wildcard => {
            Ok(nodes.into_iter().flat_map(children).collect())
        }
        Segment::IndexList(indices) => select_indices(&nodes, indices),
        Segment::Slice { start, end } => Ok(select_slice(nodes, *start, *end)),
        Segment::RecursiveDescent { include_leaves } => {
            descend(&nodes, *include_leaves, e_ctx.config.max_depth)
        }
        Segment::Filter(predicate) => apply_filter(nodes, predicate, e_ctx),
        Segment::BareToken(token) => select_token(nodes, token),
        Segment::Function(function) => {
            log::debug!("Applying {}() to {} nodes", function.name(), nodes.len());
            Ok(nodes.iter().flat_map(|n| function.apply(n)).collect())
        }
    }
}

// --- Path Steps ---

fn select_key(nodes: Vec<Value>, key: &str) -> Vec<Value> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            Value::Object(mut map) => map.remove(key),
            _ => None,
        })
        .collect()
}

/// Array elements, or object values in key order.
fn children(node: Value) -> Vec<Value> {
    match node {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        _ => Vec::new(),
    }
}

fn child_refs(node: &Value) -> Vec<&Value> {
    match node {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    }
}

fn select_indices(nodes: &[Value], indices: &[usize]) -> Result<Vec<Value>, JPathError> {
    let mut result = Vec::new();
    for items in nodes.iter().filter_map(Value::as_array) {
        for &index in indices {
            let item = items.get(index).ok_or(JPathError::IndexOutOfRange {
                index,
                len: items.len(),
            })?;
            result.push(item.clone());
        }
    }
    Ok(result)
}

/// Resolves `[start:end]` against `len` the way from-end indexing does: negatives count
/// back from the end and both bounds are clamped.
fn slice_bounds(len: usize, start: Option<i64>, end: Option<i64>) -> (usize, usize) {
    let len = len as i64;
    let clamp = |i: i64| if i < 0 { (len + i).max(0) } else { i.min(len) };
    let start = start.map_or(0, clamp);
    let end = end.map_or(len, clamp).max(start);
    (start as usize, end as usize)
}

fn select_slice(nodes: Vec<Value>, start: Option<i64>, end: Option<i64>) -> Vec<Value> {
    let mut result = Vec::new();
    for node in nodes {
        if let Value::Array(items) = node {
            let (from, to) = slice_bounds(items.len(), start, end);
            result.extend(items.into_iter().skip(from).take(to - from));
        }
    }
    result
}

/// Pre-order walk with an explicit stack. Without leaves, every array and object met is
/// collected, starting with the node itself; with leaves, the walk starts at the node's
/// children and collects scalars too.
fn descend(
    nodes: &[Value],
    include_leaves: bool,
    max_depth: usize,
) -> Result<Vec<Value>, JPathError> {
    let mut result = Vec::new();
    for node in nodes {
        let mut stack: Vec<(&Value, usize)> = if include_leaves {
            child_refs(node).into_iter().rev().map(|c| (c, 1)).collect()
        } else {
            vec![(node, 0)]
        };
        while let Some((current, depth)) = stack.pop() {
            match current {
                Value::Array(_) | Value::Object(_) => {
                    if depth > max_depth {
                        return Err(JPathError::DepthLimitExceeded(max_depth));
                    }
                    result.push(current.clone());
                    stack.extend(child_refs(current).into_iter().rev().map(|c| (c, depth + 1)));
                }
                _ if include_leaves => result.push(current.clone()),
                _ => {}
            }
        }
    }
    Ok(result)
}

/// A bare name selects an object member; bare digits also index into arrays.
fn select_token(nodes: Vec<Value>, token: &str) -> Result<Vec<Value>, JPathError> {
    let index = token
        .bytes()
        .all(|b| b.is_ascii_digit())
        .then(|| token.parse::<usize>().ok())
        .flatten();
    let mut result = Vec::new();
    for node in nodes {
        match (node, index) {
            (Value::Object(mut map), _) => result.extend(map.remove(token)),
            (Value::Array(mut items), Some(index)) => {
                if index >= items.len() {
                    return Err(JPathError::IndexOutOfRange {
                        index,
                        len: items.len(),
                    });
                }
                result.push(items.swap_remove(index));
            }
            _ => {}
        }
    }
    Ok(result)
}

// --- Filters ---

/// Sub-query operands of one filter, each evaluated once before any candidate is tested.
struct QueryBindings<'p> {
    resolved: Vec<(&'p [Segment], Value)>,
}

impl<'p> QueryBindings<'p> {
    fn resolve(predicate: &'p Predicate, e_ctx: &EvaluationContext<'_>) -> Result<Self, JPathError> {
        let mut queries = Vec::new();
        predicate.for_each_query(&mut |segments| queries.push(segments));
        let resolved = queries
            .into_iter()
            .map(|segments| {
                let mut values = evaluate_segments(segments, e_ctx)?;
                // A single match stands for itself; anything else is compared as an array.
                let value = if values.len() == 1 {
                    values.remove(0)
                } else {
                    Value::Array(values)
                };
                Ok((segments, value))
            })
            .collect::<Result<Vec<_>, JPathError>>()?;
        Ok(Self { resolved })
    }

    fn get(&self, segments: &[Segment]) -> Option<&Value> {
        self.resolved
            .iter()
            .find(|(s, _)| std::ptr::eq(*s, segments))
            .map(|(_, v)| v)
    }

    fn operand<'a>(&'a self, operand: &'a Operand) -> Option<&'a Value> {
        match operand {
            Operand::Literal(value) => Some(value),
            Operand::Query(segments) => self.get(segments),
        }
    }
}

/// Keeps the candidates that satisfy `predicate`, in their original order.
///
/// A node set holding exactly one array offers its elements as candidates; any other node
/// set offers its object members.
fn apply_filter(
    mut nodes: Vec<Value>,
    predicate: &Predicate,
    e_ctx: &EvaluationContext<'_>,
) -> Result<Vec<Value>, JPathError> {
    let bindings = QueryBindings::resolve(predicate, e_ctx)?;
    let candidates = if matches!(nodes.as_slice(), [Value::Array(_)]) {
        children(nodes.remove(0))
    } else {
        nodes.into_iter().filter(Value::is_object).collect()
    };
    Ok(candidates
        .into_iter()
        .filter(|candidate| satisfies(predicate, candidate, &bindings))
        .collect())
}

fn satisfies(predicate: &Predicate, candidate: &Value, bindings: &QueryBindings<'_>) -> bool {
    match predicate {
        Predicate::Compare { path, op, operand } => {
            match (path.resolve(candidate), bindings.operand(operand)) {
                (Some(left), Some(right)) => compare(left, *op, right),
                _ => false,
            }
        }
        Predicate::Regex { path, pattern } => path
            .resolve(candidate)
            .and_then(Value::as_str)
            .is_some_and(|s| pattern.is_match(s)),
        Predicate::Set { path, op, operand } => {
            match (path.resolve(candidate), bindings.operand(operand)) {
                (Some(left), Some(right)) => set_relation(left, *op, right),
                _ => false,
            }
        }
        Predicate::SizeEquals { path, size } => {
            path.resolve(candidate).and_then(size_of) == Some(*size)
        }
        Predicate::Empty(path) => path.resolve(candidate).and_then(size_of) == Some(0),
        Predicate::Truthy(path) => path.resolve(candidate).is_some_and(is_truthy),
        Predicate::Not(inner) => !satisfies(inner, candidate, bindings),
        Predicate::And(branches) => branches
            .iter()
            .all(|branch| satisfies(branch, candidate, bindings)),
        Predicate::Or(branches) => branches
            .iter()
            .any(|branch| satisfies(branch, candidate, bindings)),
    }
}

/// Operands of different JSON types never compare, not even as unequal.
fn compare(left: &Value, op: CompareOp, right: &Value) -> bool {
    if !same_type(left, right) {
        return false;
    }
    let ordering = || compare_values(left, right);
    match op {
        CompareOp::Equals => values_equal(left, right),
        CompareOp::NotEquals => !values_equal(left, right),
        CompareOp::LessThan => ordering() == Some(Ordering::Less),
        CompareOp::LessThanOrEqual => {
            matches!(ordering(), Some(Ordering::Less | Ordering::Equal))
        }
        CompareOp::GreaterThan => ordering() == Some(Ordering::Greater),
        CompareOp::GreaterThanOrEqual => {
            matches!(ordering(), Some(Ordering::Greater | Ordering::Equal))
        }
    }
}

fn set_relation(left: &Value, op: SetOp, right: &Value) -> bool {
    match op {
        SetOp::In => right.as_array().is_some_and(|items| contains(items, left)),
        SetOp::NotIn => right.as_array().is_some_and(|items| !contains(items, left)),
        SetOp::Contains => left.as_array().is_some_and(|items| contains(items, right)),
        SetOp::NotContains => left.as_array().is_some_and(|items| !contains(items, right)),
        SetOp::SubsetOf | SetOp::SupersetOf | SetOp::AnyOf | SetOp::NoneOf => {
            let (Some(left), Some(right)) = (left.as_array(), right.as_array()) else {
                return false;
            };
            match op {
                SetOp::SubsetOf => left.iter().all(|item| contains(right, item)),
                SetOp::SupersetOf => right.iter().all(|item| contains(left, item)),
                SetOp::AnyOf => left.iter().any(|item| contains(right, item)),
                _ => !left.iter().any(|item| contains(right, item)),
            }
        }
    }
}
