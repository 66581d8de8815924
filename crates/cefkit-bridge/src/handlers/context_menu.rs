use std::sync::LazyLock;

use crate::bridge::{BoundHandler, Bridged, CallbackTable, ObjectBridge};
use crate::handle::{NativeHandle, ObjectKind};
use crate::registry::HandleRegistry;
use crate::wrappers::{Browser, Frame, MenuModel};

use super::native_bool;

pub trait ContextMenuHandler: Send + Sync {
    /// Called before the menu is shown. Clear `model` to suppress it.
    fn on_before_context_menu(&self, _browser: &Browser, _frame: &Frame, _model: &MenuModel) {}

    /// Return true when the command was handled here.
    fn on_context_menu_command(
        &self,
        _browser: &Browser,
        _frame: &Frame,
        _command_id: i32,
        _event_flags: u32,
    ) -> bool {
        false
    }

    fn on_context_menu_dismissed(&self, _browser: &Browser, _frame: &Frame) {}
}

#[derive(Clone, Copy)]
pub struct ContextMenuTable {
    pub back_ref: NativeHandle,
    pub on_before_context_menu: fn(NativeHandle, NativeHandle, NativeHandle, NativeHandle),
    pub on_context_menu_command: fn(NativeHandle, NativeHandle, NativeHandle, i32, u32) -> i32,
    pub on_context_menu_dismissed: fn(NativeHandle, NativeHandle, NativeHandle),
}

static CONTEXT_MENU_HANDLERS: LazyLock<HandleRegistry<BoundHandler<dyn ContextMenuHandler>>> =
    LazyLock::new(HandleRegistry::new);

impl Bridged for dyn ContextMenuHandler {
    const KIND: ObjectKind = ObjectKind::ContextMenuHandler;

    fn registry() -> &'static HandleRegistry<BoundHandler<Self>> {
        &CONTEXT_MENU_HANDLERS
    }

    fn callback_table(back_ref: NativeHandle) -> CallbackTable {
        CallbackTable::ContextMenu(ContextMenuTable {
            back_ref,
            on_before_context_menu,
            on_context_menu_command,
            on_context_menu_dismissed,
        })
    }
}

fn browser_and_frame(
    bound: &BoundHandler<dyn ContextMenuHandler>,
    browser: NativeHandle,
    frame: NativeHandle,
) -> Option<(Browser, Frame)> {
    Some((
        Browser::from_borrowed(bound.engine(), browser)?,
        Frame::from_borrowed(bound.engine(), frame)?,
    ))
}

fn on_before_context_menu(
    this: NativeHandle,
    browser: NativeHandle,
    frame: NativeHandle,
    model: NativeHandle,
) {
    let Some(bound) = ObjectBridge::resolve::<dyn ContextMenuHandler>(this) else {
        return;
    };
    let Some((browser, frame)) = browser_and_frame(&bound, browser, frame) else {
        return;
    };
    if let Some(model) = MenuModel::from_borrowed(bound.engine(), model) {
        bound.handler().on_before_context_menu(&browser, &frame, &model);
    }
}

fn on_context_menu_command(
    this: NativeHandle,
    browser: NativeHandle,
    frame: NativeHandle,
    command_id: i32,
    event_flags: u32,
) -> i32 {
    let Some(bound) = ObjectBridge::resolve::<dyn ContextMenuHandler>(this) else {
        return 0;
    };
    let Some((browser, frame)) = browser_and_frame(&bound, browser, frame) else {
        return 0;
    };
    native_bool(
        bound
            .handler()
            .on_context_menu_command(&browser, &frame, command_id, event_flags),
    )
}

fn on_context_menu_dismissed(this: NativeHandle, browser: NativeHandle, frame: NativeHandle) {
    let Some(bound) = ObjectBridge::resolve::<dyn ContextMenuHandler>(this) else {
        return;
    };
    if let Some((browser, frame)) = browser_and_frame(&bound, browser, frame) {
        bound.handler().on_context_menu_dismissed(&browser, &frame);
    }
}
