//! Boots each role on its own in-memory engine.

use std::sync::Arc;

use cefkit_bridge::mock::InMemoryEngine;
use cefkit_bridge::{
    App, AppHandlers, Bound, Browser, BrowserProcessHandler, Client, NativeEngine, NativeHandle,
    ObjectBridge, RenderProcessHandler,
};
use cefkit_common::{BridgeError, ProcessRole};
use cefkit_config::CefkitConfig;
use cefkit_ipc::{ControllerEndpoint, ScriptEndpoint};
use tracing::info;

use crate::evaluator;

pub const BROWSER_ID: i32 = 1;
pub const MAIN_FRAME_ID: i64 = 1;

struct Lifecycle {
    url: String,
}

impl BrowserProcessHandler for Lifecycle {
    fn on_context_initialized(&self) {
        info!(url = %self.url, "engine initialized");
    }
}

pub struct Controller {
    pub engine: Arc<InMemoryEngine>,
    pub endpoint: Arc<ControllerEndpoint>,
    pub browser: Browser,
    _client: Bound<dyn Client>,
    _app: Bound<dyn App>,
}

impl Controller {
    pub fn start(config: &CefkitConfig, url: &str) -> Result<Self, BridgeError> {
        let engine = Arc::new(InMemoryEngine::new(ProcessRole::Controller));
        let native: Arc<dyn NativeEngine> = engine.clone();

        let lifecycle = ObjectBridge::install::<dyn BrowserProcessHandler>(
            &native,
            Arc::new(Lifecycle { url: url.to_owned() }),
        )?;
        let app = ObjectBridge::install::<dyn App>(
            &native,
            Arc::new(AppHandlers {
                browser_process: Some(lifecycle),
                render_process: None,
            }),
        )?;
        engine.set_app(app.handle());

        let endpoint = ControllerEndpoint::new(config);
        let client = ObjectBridge::install::<dyn Client>(&native, endpoint.clone())?;
        let handle = engine.create_browser(BROWSER_ID, MAIN_FRAME_ID, client.handle());
        let browser = Browser::try_from_native(&native, handle)?;
        info!(browser = %browser.identifier(), url, "browser created");

        Ok(Self {
            engine,
            endpoint,
            browser,
            _client: client,
            _app: app,
        })
    }

    pub fn shutdown(&self) {
        self.engine.close_browser(BROWSER_ID);
        self.engine.set_app(NativeHandle::NULL);
    }
}

pub struct ScriptExecutor {
    pub engine: Arc<InMemoryEngine>,
    pub endpoint: Arc<ScriptEndpoint>,
    pub browser: Browser,
    _app: Bound<dyn App>,
}

impl ScriptExecutor {
    pub fn start(config: &CefkitConfig) -> Result<Self, BridgeError> {
        let engine = Arc::new(InMemoryEngine::new(ProcessRole::ScriptExecutor));
        let native: Arc<dyn NativeEngine> = engine.clone();
        engine.set_evaluator(evaluator::evaluate);

        let endpoint = ScriptEndpoint::new(config);
        let handler =
            ObjectBridge::install::<dyn RenderProcessHandler>(&native, endpoint.clone())?;
        let app = ObjectBridge::install::<dyn App>(
            &native,
            Arc::new(AppHandlers {
                browser_process: None,
                render_process: Some(handler),
            }),
        )?;
        engine.set_app(app.handle());

        let handle = engine.create_browser(BROWSER_ID, MAIN_FRAME_ID, NativeHandle::NULL);
        let browser = Browser::try_from_native(&native, handle)?;

        Ok(Self {
            engine,
            endpoint,
            browser,
            _app: app,
        })
    }

    pub fn shutdown(&self) {
        self.engine.close_browser(BROWSER_ID);
        self.engine.set_app(NativeHandle::NULL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_roles_start_and_shut_down_cleanly() {
        let config = CefkitConfig::default();
        let controller = Controller::start(&config, "about:blank").unwrap();
        let script = ScriptExecutor::start(&config).unwrap();
        assert!(controller.engine.fire_context_initialized());
        assert!(script.engine.fire_context_created(BROWSER_ID, MAIN_FRAME_ID));

        let controller_engine = Arc::clone(&controller.engine);
        let script_engine = Arc::clone(&script.engine);
        controller.shutdown();
        script.shutdown();
        drop(controller);
        drop(script);

        assert_eq!(controller_engine.over_releases(), 0);
        assert_eq!(script_engine.over_releases(), 0);
        assert_eq!(controller_engine.live_objects(), 0);
        assert_eq!(script_engine.live_objects(), 0);
    }
}
