use std::fmt;

/// A model-level error: a malformed EDAM value or unreadable input.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The model JSON could not be deserialized.
    InvalidInput(String),
    /// A transition references a state outside the declared state set.
    UnknownState {
        transition: String,
        state: String,
    },
    /// The declared initial state is not in the state set.
    UnknownInitialState(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidInput(msg) => write!(f, "invalid model input: {}", msg),
            ModelError::UnknownState { transition, state } => write!(
                f,
                "transition '{}' references undeclared state '{}'",
                transition, state
            ),
            ModelError::UnknownInitialState(state) => {
                write!(f, "initial state '{}' is not in the state set", state)
            }
        }
    }
}

impl std::error::Error for ModelError {}
