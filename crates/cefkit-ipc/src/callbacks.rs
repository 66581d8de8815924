//! Script callbacks the controller may invoke by id.

use std::collections::HashMap;
use std::sync::Arc;

use cefkit_common::{next_correlation_id, ListValue, Value};
use parking_lot::Mutex;
use tracing::debug;

pub type ScriptCallback = Arc<dyn Fn(&ListValue) -> Result<Value, String> + Send + Sync>;

#[derive(Default)]
pub struct ScriptCallbacks {
    callbacks: Mutex<HashMap<i64, ScriptCallback>>,
}

impl ScriptCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `callback` and return the id the controller will use for it.
    pub fn register(
        &self,
        callback: impl Fn(&ListValue) -> Result<Value, String> + Send + Sync + 'static,
    ) -> i64 {
        let id = next_correlation_id();
        self.callbacks.lock().insert(id, Arc::new(callback));
        id
    }

    /// Run callback `id`. A destroyed or unknown id is an error the caller
    /// sends back as a failure response.
    pub fn invoke(&self, id: i64, args: &ListValue) -> Result<Value, String> {
        let callback = self.callbacks.lock().get(&id).cloned();
        match callback {
            Some(callback) => callback(args),
            None => {
                debug!(callback_id = id, "invoke of unknown callback");
                Err(format!("callback {id} does not exist"))
            }
        }
    }

    pub fn destroy(&self, id: i64) -> bool {
        self.callbacks.lock().remove(&id).is_some()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.callbacks.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.callbacks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoke_then_destroy() {
        let callbacks = ScriptCallbacks::new();
        let id = callbacks.register(|args| Ok(Value::Int(args.len() as i64)));

        let mut args = ListValue::new();
        args.push(1);
        args.push("two");
        assert_eq!(callbacks.invoke(id, &args), Ok(Value::Int(2)));

        assert!(callbacks.destroy(id));
        assert!(!callbacks.destroy(id));
        assert!(callbacks.invoke(id, &args).is_err());
        assert!(callbacks.is_empty());
    }

    #[test]
    fn callback_may_reenter_the_table() {
        let callbacks = Arc::new(ScriptCallbacks::new());
        let inner = Arc::downgrade(&callbacks);
        let id = callbacks.register(move |_| {
            let live = inner.upgrade().map_or(0, |c| c.len());
            Ok(Value::Int(live as i64))
        });
        assert_eq!(callbacks.invoke(id, &ListValue::new()), Ok(Value::Int(1)));
    }
}
