//! Native objects exposed to page script and their async methods.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use cefkit_common::{ListValue, Value};
use parking_lot::RwLock;
use tracing::debug;

use crate::codec::{BoundObject, MethodCall, Reply};

pub type Method = Arc<dyn Fn(&ListValue) -> Result<Value, String> + Send + Sync>;

struct Entry {
    name: String,
    methods: HashMap<String, Method>,
}

#[derive(Default)]
struct Objects {
    by_id: HashMap<i64, Entry>,
    next_id: i64,
    /// Names the script side reported as bound in its context.
    bound: BTreeSet<String>,
}

/// Objects this process answers `async-method-call-request`s for, plus
/// the names the peer reported as bound.
#[derive(Default)]
pub struct ObjectRepository {
    inner: RwLock<Objects>,
}

impl ObjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose a new object under `name`. Returns its object id.
    pub fn register_object(&self, name: impl Into<String>) -> i64 {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.by_id.insert(
            id,
            Entry {
                name: name.into(),
                methods: HashMap::new(),
            },
        );
        id
    }

    pub fn register_method(
        &self,
        object_id: i64,
        method: impl Into<String>,
        f: impl Fn(&ListValue) -> Result<Value, String> + Send + Sync + 'static,
    ) -> bool {
        match self.inner.write().by_id.get_mut(&object_id) {
            Some(entry) => {
                entry.methods.insert(method.into(), Arc::new(f));
                true
            }
            None => false,
        }
    }

    pub fn object_id(&self, name: &str) -> Option<i64> {
        self.inner
            .read()
            .by_id
            .iter()
            .find(|(_, e)| e.name == name)
            .map(|(id, _)| *id)
    }

    /// Run `method` on `object_id`. The method runs without the lock held.
    pub fn call(&self, object_id: i64, method: &str, args: &ListValue) -> Result<Value, String> {
        let found = {
            let inner = self.inner.read();
            match inner.by_id.get(&object_id) {
                Some(entry) => entry
                    .methods
                    .get(method)
                    .cloned()
                    .ok_or_else(|| format!("{} has no method {method}", entry.name)),
                None => Err(format!("object {object_id} is not registered")),
            }
        };
        let f = found.inspect_err(|e| debug!(object_id, method, error = %e, "call rejected"))?;
        f(args)
    }

    /// Run `call` and build the reply that goes back on the wire.
    pub fn answer(&self, call: &MethodCall) -> Reply {
        Reply {
            id: call.id,
            result: self.call(call.object_id, &call.method, &call.args),
        }
    }

    /// Descriptors for every registered object, for announcing them.
    pub fn descriptors(&self) -> Vec<BoundObject> {
        let inner = self.inner.read();
        let mut objects: Vec<BoundObject> = inner
            .by_id
            .values()
            .map(|e| BoundObject {
                name: e.name.clone(),
                is_cached: false,
                already_bound: inner.bound.contains(&e.name),
            })
            .collect();
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        objects
    }

    /// Record objects the peer bound in its script context.
    pub fn mark_bound(&self, objects: &[BoundObject]) {
        let mut inner = self.inner.write();
        inner.bound.extend(objects.iter().map(|o| o.name.clone()));
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.inner.read().bound.contains(name)
    }

    pub fn bound_names(&self) -> Vec<String> {
        self.inner.read().bound.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_registered_method() {
        let repo = ObjectRepository::new();
        let id = repo.register_object("math");
        assert!(repo.register_method(id, "double", |args| {
            args.int(0)
                .map(|n| Value::Int(n * 2))
                .ok_or_else(|| "expected an int".to_owned())
        }));

        let mut args = ListValue::new();
        args.push(21);
        assert_eq!(repo.call(id, "double", &args), Ok(Value::Int(42)));
        assert_eq!(repo.object_id("math"), Some(id));
    }

    #[test]
    fn unknown_targets_are_errors() {
        let repo = ObjectRepository::new();
        let id = repo.register_object("math");
        assert_eq!(
            repo.call(id, "sqrt", &ListValue::new()),
            Err("math has no method sqrt".into())
        );
        assert!(repo.call(id + 1, "sqrt", &ListValue::new()).is_err());
        assert!(!repo.register_method(id + 1, "sqrt", |_| Ok(Value::Null)));
    }

    #[test]
    fn bound_names_accumulate() {
        let repo = ObjectRepository::new();
        repo.register_object("files");
        repo.mark_bound(&[BoundObject {
            name: "files".into(),
            is_cached: false,
            already_bound: false,
        }]);
        assert!(repo.is_bound("files"));
        assert_eq!(repo.bound_names(), vec!["files".to_owned()]);
        assert!(repo.descriptors()[0].already_bound);
    }

    #[test]
    fn answer_carries_the_request_id() {
        let repo = ObjectRepository::new();
        let id = repo.register_object("echo");
        repo.register_method(id, "first", |args| Ok(args.get(0).cloned().unwrap_or(Value::Null)));

        let mut args = ListValue::new();
        args.push("hi");
        let call = MethodCall {
            id: 9,
            object_id: id,
            method: "first".into(),
            args,
        };
        let reply = repo.answer(&call);
        assert_eq!(reply.id, 9);
        assert_eq!(reply.result, Ok(Value::from("hi")));
    }
}
