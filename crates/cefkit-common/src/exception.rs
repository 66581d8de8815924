use serde::{Deserialize, Serialize};

/// An uncaught script exception with its source location.
///
/// Positions are character offsets into the script resource, columns are
/// within `line_number` (1-based).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRecord {
    pub message: String,
    pub line_number: i32,
    pub start_position: i32,
    pub end_position: i32,
    pub start_column: i32,
    pub end_column: i32,
}

impl ExceptionRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// One frame of a script stack trace. Available locally on the script side
/// only; stack traces are not carried across the process boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub function_name: String,
    pub script_name: String,
    pub line_number: i32,
    pub column: i32,
}
