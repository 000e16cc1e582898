use std::fmt;

/// An error raised while compiling one model to contract source.
///
/// Only malformed-model conditions are errors. The call-tree builder's
/// inability to merge a transition group is a sentinel (`None`), not an
/// error, and never surfaces here.
#[derive(Debug, Clone)]
pub enum CodegenError {
    /// An expression shape the evaluator does not support.
    UnsupportedExpression(String),
    /// A builtin mutation call with the wrong argument count.
    InvalidBuiltin { operation: String, expected: usize, found: usize },
    /// The deduplication pass was handed something other than an
    /// `update_map` call.
    NotAnUpdateMap(String),
    /// A transition routed to the constructor builder without deploy
    /// semantics.
    NotADeployTransition(String),
    /// Wrapper attaching the offending model's name at the
    /// `generate_contract` boundary.
    Model { name: String, source: Box<CodegenError> },
}

impl CodegenError {
    pub fn unsupported(exp: &(impl fmt::Debug + ?Sized)) -> Self {
        CodegenError::UnsupportedExpression(format!("{:?}", exp))
    }

    /// Attach the model name, unless one is already attached.
    pub fn in_model(self, name: &str) -> Self {
        match self {
            CodegenError::Model { .. } => self,
            other => CodegenError::Model {
                name: name.to_string(),
                source: Box::new(other),
            },
        }
    }
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenError::UnsupportedExpression(detail) => {
                write!(f, "unrecognized expression: {}", detail)
            }
            CodegenError::InvalidBuiltin {
                operation,
                expected,
                found,
            } => write!(
                f,
                "builtin '{}' expects {} arguments, found {}",
                operation, expected, found
            ),
            CodegenError::NotAnUpdateMap(detail) => {
                write!(f, "expected an update_map call, found: {}", detail)
            }
            CodegenError::NotADeployTransition(operation) => write!(
                f,
                "transition '{}' is not a deploy transition (constructor)",
                operation
            ),
            CodegenError::Model { name, source } => {
                write!(f, "model '{}': {}", name, source)
            }
        }
    }
}

impl std::error::Error for CodegenError {}
