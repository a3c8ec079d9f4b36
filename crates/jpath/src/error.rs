use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JPathError {
    #[error("Expression '{0}' is not a parsable JSONPath: it must start with '$'")]
    MalformedQuery(String),

    #[error("Unrecognized path segment at '{0}'")]
    UnrecognizedSegment(String),

    #[error("Ungrammatical filter '{filter}': {message}")]
    UngrammaticalFilter { filter: String, message: String },

    #[error("Unknown function '{0}()'")]
    UnknownFunction(String),

    #[error("Index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Maximum depth of {0} exceeded")]
    DepthLimitExceeded(usize),
}

impl JPathError {
    pub(crate) fn ungrammatical(filter: &str, message: impl Into<String>) -> Self {
        JPathError::UngrammaticalFilter {
            filter: filter.to_string(),
            message: message.into(),
        }
    }
}

