//! Defines the Abstract Syntax Tree (AST) for JSONPath expressions and filter predicates.
use crate::functions::Function;
use regex::Regex;
use serde_json::Value;
use std::fmt;

/// One syntactic unit of a path expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// The document root (`$`).
    Root,
    /// A lone `.`, which keeps the current node set.
    Current,
    /// An object key (e.g., `.name`).
    DotKey(String),
    /// `.*`
    DotWildcard,
    /// A quoted object key (e.g., `['name']`).
    BracketKey(String),
    /// An explicit list of array indices (e.g., `[0, 2]`).
    IndexList(Vec<usize>),
    /// An array slice (e.g., `[1:3]`, `[-1:]`).
    Slice { start: Option<i64>, end: Option<i64> },
    /// `[*]`
    Wildcard,
    /// `..`, or `..*` / `..[*]` when `include_leaves` is set.
    RecursiveDescent { include_leaves: bool },
    /// A compiled `[?( ... )]` filter.
    Filter(Predicate),
    /// A bare property name or array index (e.g., `key1`, `.0`).
    BareToken(String),
    /// An aggregate or structural function call (e.g., `.avg()`).
    Function(Function),
}

/// A relative path below the filter candidate (`@`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelativePath(pub Vec<PathStep>);

#[derive(Debug, Clone, PartialEq)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

impl RelativePath {
    /// Follows the path below `value`, returning `None` as soon as a step is missing.
    pub fn resolve<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        self.0.iter().try_fold(value, |current, step| match step {
            PathStep::Key(key) => current.as_object()?.get(key),
            PathStep::Index(index) => current.as_array()?.get(*index),
        })
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@")?;
        for step in &self.0 {
            match step {
                PathStep::Key(key) => write!(f, "['{}']", key)?,
                PathStep::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl CompareOp {
    /// The operator to use once both operands trade sides.
    pub fn mirrored(self) -> Self {
        match self {
            CompareOp::LessThan => CompareOp::GreaterThan,
            CompareOp::GreaterThan => CompareOp::LessThan,
            CompareOp::LessThanOrEqual => CompareOp::GreaterThanOrEqual,
            CompareOp::GreaterThanOrEqual => CompareOp::LessThanOrEqual,
            other => other,
        }
    }
}

/// Set relations between the value at `@<path>` (left) and the operand (right).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    /// Left is a member of the right array.
    In,
    /// Left is not a member of the right array.
    NotIn,
    /// The left array has the right value as a member.
    Contains,
    /// The left array does not have the right value as a member.
    NotContains,
    /// Every member of the left array is in the right array.
    SubsetOf,
    /// Every member of the right array is in the left array.
    SupersetOf,
    AnyOf,
    NoneOf,
}

impl SetOp {
    pub fn mirrored(self) -> Self {
        match self {
            SetOp::In => SetOp::Contains,
            SetOp::NotIn => SetOp::NotContains,
            SetOp::Contains => SetOp::In,
            SetOp::NotContains => SetOp::NotIn,
            SetOp::SubsetOf => SetOp::SupersetOf,
            SetOp::SupersetOf => SetOp::SubsetOf,
            symmetric => symmetric,
        }
    }
}

/// The non-`@` side of an atomic predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    /// An absolute sub-query (`$...`), run against the whole document.
    Query(Vec<Segment>),
}

/// A compiled `/body/` or `/body/i` regex literal.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub source: String,
    pub case_insensitive: bool,
    regex: Regex,
}

impl Pattern {
    /// Compiles the literal so that it matches from the start of the subject.
    pub fn new(source: &str, case_insensitive: bool) -> Result<Self, regex::Error> {
        let flags = if case_insensitive { "(?i)" } else { "" };
        let regex = Regex::new(&format!("{}^(?:{})", flags, source))?;
        Ok(Self {
            source: source.to_string(),
            case_insensitive,
            regex,
        })
    }

    pub fn is_match(&self, subject: &str) -> bool {
        self.regex.is_match(subject)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.case_insensitive == other.case_insensitive
    }
}

/// A compiled filter expression, always with the `@` operand on the left.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        path: RelativePath,
        op: CompareOp,
        operand: Operand,
    },
    Regex {
        path: RelativePath,
        pattern: Pattern,
    },
    Set {
        path: RelativePath,
        op: SetOp,
        operand: Operand,
    },
    SizeEquals {
        path: RelativePath,
        size: usize,
    },
    Empty(RelativePath),
    Truthy(RelativePath),
    Not(Box<Predicate>),
    /// Every branch holds; a chain of `&&` is flattened into one node.
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Returns the operand of a leaf that carries one.
    pub fn operand(&self) -> Option<&Operand> {
        match self {
            Predicate::Compare { operand, .. } | Predicate::Set { operand, .. } => Some(operand),
            _ => None,
        }
    }

    /// Visits every sub-query operand in the tree, left to right.
    pub fn for_each_query<'p>(&'p self, visit: &mut impl FnMut(&'p [Segment])) {
        match self {
            Predicate::Not(inner) => inner.for_each_query(visit),
            Predicate::And(branches) | Predicate::Or(branches) => {
                for branch in branches {
                    branch.for_each_query(visit);
                }
            }
            leaf => {
                if let Some(Operand::Query(segments)) = leaf.operand() {
                    visit(segments);
                }
            }
        }
    }
}
