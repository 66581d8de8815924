use std::sync::Arc;

use crate::bridge::Bound;
use crate::engine::NativeEngine;
use crate::handle::{NativeHandle, ObjectKind};
use crate::handlers::MenuModelDelegate;
use crate::proxy::{Proxy, ProxyKind};

pub struct MenuModelKind;

impl ProxyKind for MenuModelKind {
    const KIND: ObjectKind = ObjectKind::MenuModel;
}

pub type MenuModel = Proxy<MenuModelKind>;

impl Proxy<MenuModelKind> {
    /// A new, empty menu whose events go to `delegate`.
    pub fn create(
        engine: &Arc<dyn NativeEngine>,
        delegate: Option<&Bound<dyn MenuModelDelegate>>,
    ) -> Option<Self> {
        // The engine takes its own reference to the delegate.
        let delegate = delegate.map_or(NativeHandle::NULL, |d| d.handle());
        Self::from_native(engine, engine.menu_model_create(delegate))
    }

    pub fn count(&self) -> usize {
        self.engine().menu_model_count(self.handle())
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn clear(&self) -> bool {
        self.engine().menu_model_clear(self.handle())
    }

    pub fn add_separator(&self) -> bool {
        self.engine().menu_model_add_separator(self.handle())
    }

    pub fn add_item(&self, command_id: i32, label: &str) -> bool {
        self.engine()
            .menu_model_add_item(self.handle(), command_id, label)
    }

    pub fn command_id_at(&self, index: usize) -> Option<i32> {
        self.engine().menu_model_command_id_at(self.handle(), index)
    }

    pub fn label_at(&self, index: usize) -> Option<String> {
        self.engine().menu_model_label_at(self.handle(), index)
    }
}
