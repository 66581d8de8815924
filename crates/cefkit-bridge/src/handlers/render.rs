use std::sync::LazyLock;

use crate::bridge::{BoundHandler, Bridged, CallbackTable, ObjectBridge};
use crate::handle::{NativeHandle, ObjectKind};
use crate::registry::HandleRegistry;
use crate::wrappers::Browser;

use super::native_bool;

/// A rectangle in view or screen coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Geometry queries for off-screen rendering.
///
/// Each query answers `None` to let the engine fall back to its own value.
pub trait RenderHandler: Send + Sync {
    fn root_screen_rect(&self, _browser: &Browser) -> Option<Rect> {
        None
    }

    fn view_rect(&self, _browser: &Browser) -> Option<Rect> {
        None
    }

    /// Convert a view coordinate to a screen coordinate.
    fn screen_point(&self, _browser: &Browser, _view: Point) -> Option<Point> {
        None
    }
}

#[derive(Clone, Copy)]
pub struct RenderTable {
    pub back_ref: NativeHandle,
    pub get_root_screen_rect: fn(NativeHandle, NativeHandle, &mut Rect) -> i32,
    pub get_view_rect: fn(NativeHandle, NativeHandle, &mut Rect) -> i32,
    pub get_screen_point: fn(NativeHandle, NativeHandle, i32, i32, &mut i32, &mut i32) -> i32,
}

static RENDER_HANDLERS: LazyLock<HandleRegistry<BoundHandler<dyn RenderHandler>>> =
    LazyLock::new(HandleRegistry::new);

impl Bridged for dyn RenderHandler {
    const KIND: ObjectKind = ObjectKind::RenderHandler;

    fn registry() -> &'static HandleRegistry<BoundHandler<Self>> {
        &RENDER_HANDLERS
    }

    fn callback_table(back_ref: NativeHandle) -> CallbackTable {
        CallbackTable::Render(RenderTable {
            back_ref,
            get_root_screen_rect,
            get_view_rect,
            get_screen_point,
        })
    }
}

fn query<T>(
    this: NativeHandle,
    browser: NativeHandle,
    f: impl FnOnce(&dyn RenderHandler, &Browser) -> Option<T>,
) -> Option<T> {
    let bound = ObjectBridge::resolve::<dyn RenderHandler>(this)?;
    let browser = Browser::from_borrowed(bound.engine(), browser)?;
    f(bound.handler().as_ref(), &browser)
}

fn get_root_screen_rect(this: NativeHandle, browser: NativeHandle, rect: &mut Rect) -> i32 {
    let answer = query(this, browser, |h, b| h.root_screen_rect(b));
    if let Some(r) = answer {
        *rect = r;
    }
    native_bool(answer.is_some())
}

fn get_view_rect(this: NativeHandle, browser: NativeHandle, rect: &mut Rect) -> i32 {
    let answer = query(this, browser, |h, b| h.view_rect(b));
    if let Some(r) = answer {
        *rect = r;
    }
    native_bool(answer.is_some())
}

fn get_screen_point(
    this: NativeHandle,
    browser: NativeHandle,
    view_x: i32,
    view_y: i32,
    screen_x: &mut i32,
    screen_y: &mut i32,
) -> i32 {
    let answer = query(this, browser, |h, b| h.screen_point(b, Point::new(view_x, view_y)));
    if let Some(p) = answer {
        *screen_x = p.x;
        *screen_y = p.y;
    }
    native_bool(answer.is_some())
}
