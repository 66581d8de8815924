use std::sync::LazyLock;

use crate::bridge::{BoundHandler, Bridged, CallbackTable, ObjectBridge};
use crate::handle::{NativeHandle, ObjectKind};
use crate::registry::HandleRegistry;
use crate::wrappers::MenuModel;

use super::native_bool;

/// Receives events for menus created with [`MenuModel::create`].
pub trait MenuModelDelegate: Send + Sync {
    fn execute_command(&self, _model: &MenuModel, _command_id: i32, _event_flags: u32) {}

    fn menu_will_show(&self, _model: &MenuModel) {}

    fn menu_closed(&self, _model: &MenuModel) {}

    /// Rewrite `label` in place. Return true if it changed.
    fn format_label(&self, _model: &MenuModel, _label: &mut String) -> bool {
        false
    }
}

#[derive(Clone, Copy)]
pub struct MenuModelDelegateTable {
    pub back_ref: NativeHandle,
    pub execute_command: fn(NativeHandle, NativeHandle, i32, u32),
    pub menu_will_show: fn(NativeHandle, NativeHandle),
    pub menu_closed: fn(NativeHandle, NativeHandle),
    pub format_label: fn(NativeHandle, NativeHandle, &mut String) -> i32,
}

static MENU_MODEL_DELEGATES: LazyLock<HandleRegistry<BoundHandler<dyn MenuModelDelegate>>> =
    LazyLock::new(HandleRegistry::new);

impl Bridged for dyn MenuModelDelegate {
    const KIND: ObjectKind = ObjectKind::MenuModelDelegate;

    fn registry() -> &'static HandleRegistry<BoundHandler<Self>> {
        &MENU_MODEL_DELEGATES
    }

    fn callback_table(back_ref: NativeHandle) -> CallbackTable {
        CallbackTable::MenuModelDelegate(MenuModelDelegateTable {
            back_ref,
            execute_command,
            menu_will_show,
            menu_closed,
            format_label,
        })
    }
}

fn with_model(
    this: NativeHandle,
    model: NativeHandle,
    f: impl FnOnce(&dyn MenuModelDelegate, &MenuModel),
) {
    let Some(bound) = ObjectBridge::resolve::<dyn MenuModelDelegate>(this) else {
        return;
    };
    if let Some(model) = MenuModel::from_borrowed(bound.engine(), model) {
        f(bound.handler().as_ref(), &model);
    }
}

fn execute_command(this: NativeHandle, model: NativeHandle, command_id: i32, event_flags: u32) {
    with_model(this, model, |delegate, model| {
        delegate.execute_command(model, command_id, event_flags)
    });
}

fn menu_will_show(this: NativeHandle, model: NativeHandle) {
    with_model(this, model, |delegate, model| delegate.menu_will_show(model));
}

fn menu_closed(this: NativeHandle, model: NativeHandle) {
    with_model(this, model, |delegate, model| delegate.menu_closed(model));
}

fn format_label(this: NativeHandle, model: NativeHandle, label: &mut String) -> i32 {
    let mut changed = false;
    with_model(this, model, |delegate, model| {
        changed = delegate.format_label(model, label);
    });
    native_bool(changed)
}
