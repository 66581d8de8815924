//! Raw process message: a name plus an ordered argument list.
//!
//! This is the shape the engine's transport moves between processes. Typed
//! views over it live in `cefkit-ipc`.

use serde::{Deserialize, Serialize};

use crate::value::ListValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessMessage {
    name: String,
    arguments: ListValue,
}

impl ProcessMessage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: ListValue::new(),
        }
    }

    pub fn with_arguments(name: impl Into<String>, arguments: ListValue) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &ListValue {
        &self.arguments
    }

    pub fn arguments_mut(&mut self) -> &mut ListValue {
        &mut self.arguments
    }

    /// Parse a message from its JSON transport form.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn json_transport_round_trip() {
        let mut msg = ProcessMessage::new("evaluate-script-request");
        msg.arguments_mut().push(42i64);
        msg.arguments_mut().push(Value::Int(1));
        msg.arguments_mut().push("1+1");

        let raw = msg.to_json().unwrap();
        let back = ProcessMessage::from_json(&raw).unwrap();
        assert_eq!(back, msg);
        assert_eq!(back.name(), "evaluate-script-request");
        assert_eq!(back.arguments().int(0), Some(42));
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(ProcessMessage::from_json("not json").is_none());
        assert!(ProcessMessage::from_json(r#"{"name": 3}"#).is_none());
    }
}
