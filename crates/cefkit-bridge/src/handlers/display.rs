use std::sync::LazyLock;

use crate::bridge::{Bound, BoundHandler, Bridged, CallbackTable, ObjectBridge};
use crate::handle::{NativeHandle, ObjectKind};
use crate::registry::HandleRegistry;
use crate::wrappers::Browser;

/// Severity of a console message, as the engine numbers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverity {
    Default,
    Verbose,
    Info,
    Warning,
    Error,
    Fatal,
    Disable,
}

impl LogSeverity {
    pub fn from_native(value: i32) -> Self {
        match value {
            1 => LogSeverity::Verbose,
            2 => LogSeverity::Info,
            3 => LogSeverity::Warning,
            4 => LogSeverity::Error,
            5 => LogSeverity::Fatal,
            99 => LogSeverity::Disable,
            _ => LogSeverity::Default,
        }
    }

    pub fn to_native(self) -> i32 {
        match self {
            LogSeverity::Default => 0,
            LogSeverity::Verbose => 1,
            LogSeverity::Info => 2,
            LogSeverity::Warning => 3,
            LogSeverity::Error => 4,
            LogSeverity::Fatal => 5,
            LogSeverity::Disable => 99,
        }
    }
}

/// What to do with a tooltip the engine is about to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TooltipAction {
    /// Let the engine show this text.
    ShowDefault(String),
    /// The handler displays the tooltip itself.
    ShowCustom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMessageAction {
    /// Also write the message to the engine's console output.
    Show,
    Suppress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoResizeAction {
    PerformDefault,
    /// The handler resized the view.
    Handled,
}

pub trait DisplayHandler: Send + Sync {
    fn on_title_change(&self, _browser: &Browser, _title: &str) {}

    fn on_tooltip(&self, _browser: &Browser, text: &str) -> TooltipAction {
        TooltipAction::ShowDefault(text.to_owned())
    }

    fn on_console_message(
        &self,
        _browser: &Browser,
        _level: LogSeverity,
        _message: &str,
        _source: &str,
        _line: i32,
    ) -> ConsoleMessageAction {
        ConsoleMessageAction::Show
    }

    fn on_auto_resize(&self, _browser: &Browser, _width: i32, _height: i32) -> AutoResizeAction {
        AutoResizeAction::PerformDefault
    }

    /// `progress` is in [0.0, 1.0].
    fn on_loading_progress_change(&self, _browser: &Browser, _progress: f64) {}
}

#[derive(Clone, Copy)]
pub struct DisplayTable {
    pub back_ref: NativeHandle,
    pub on_title_change: fn(NativeHandle, NativeHandle, &str),
    pub on_tooltip: fn(NativeHandle, NativeHandle, &mut String) -> i32,
    pub on_console_message: fn(NativeHandle, NativeHandle, i32, &str, &str, i32) -> i32,
    pub on_auto_resize: fn(NativeHandle, NativeHandle, i32, i32) -> i32,
    pub on_loading_progress_change: fn(NativeHandle, NativeHandle, f64),
}

static DISPLAY_HANDLERS: LazyLock<HandleRegistry<BoundHandler<dyn DisplayHandler>>> =
    LazyLock::new(HandleRegistry::new);

impl Bridged for dyn DisplayHandler {
    const KIND: ObjectKind = ObjectKind::DisplayHandler;

    fn registry() -> &'static HandleRegistry<BoundHandler<Self>> {
        &DISPLAY_HANDLERS
    }

    fn callback_table(back_ref: NativeHandle) -> CallbackTable {
        CallbackTable::Display(DisplayTable {
            back_ref,
            on_title_change,
            on_tooltip,
            on_console_message,
            on_auto_resize,
            on_loading_progress_change,
        })
    }
}

fn resolve(
    this: NativeHandle,
    browser: NativeHandle,
) -> Option<(Bound<dyn DisplayHandler>, Browser)> {
    let bound = ObjectBridge::resolve::<dyn DisplayHandler>(this)?;
    let browser = Browser::from_borrowed(bound.engine(), browser)?;
    Some((bound, browser))
}

fn on_title_change(this: NativeHandle, browser: NativeHandle, title: &str) {
    if let Some((bound, browser)) = resolve(this, browser) {
        bound.handler().on_title_change(&browser, title);
    }
}

fn on_tooltip(this: NativeHandle, browser: NativeHandle, text: &mut String) -> i32 {
    let Some((bound, browser)) = resolve(this, browser) else {
        return 0;
    };
    match bound.handler().on_tooltip(&browser, text.as_str()) {
        TooltipAction::ShowDefault(shown) => {
            *text = shown;
            0
        }
        TooltipAction::ShowCustom => 1,
    }
}

fn on_console_message(
    this: NativeHandle,
    browser: NativeHandle,
    level: i32,
    message: &str,
    source: &str,
    line: i32,
) -> i32 {
    let Some((bound, browser)) = resolve(this, browser) else {
        return 0;
    };
    let level = LogSeverity::from_native(level);
    match bound
        .handler()
        .on_console_message(&browser, level, message, source, line)
    {
        ConsoleMessageAction::Show => 0,
        ConsoleMessageAction::Suppress => 1,
    }
}

fn on_auto_resize(this: NativeHandle, browser: NativeHandle, width: i32, height: i32) -> i32 {
    let Some((bound, browser)) = resolve(this, browser) else {
        return 0;
    };
    match bound.handler().on_auto_resize(&browser, width, height) {
        AutoResizeAction::PerformDefault => 0,
        AutoResizeAction::Handled => 1,
    }
}

fn on_loading_progress_change(this: NativeHandle, browser: NativeHandle, progress: f64) {
    if let Some((bound, browser)) = resolve(this, browser) {
        bound.handler().on_loading_progress_change(&browser, progress);
    }
}
