//! Both roles linked over channels, plus the tasks that move frames.

use std::time::Duration;

use cefkit_common::{BridgeError, ExceptionRecord, FrameId, Value};
use cefkit_config::CefkitConfig;
use cefkit_ipc::ProtocolEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::link;
use crate::processes::{Controller, ScriptExecutor, BROWSER_ID, MAIN_FRAME_ID};
use crate::RunError;

pub struct Session {
    pub controller: Controller,
    pub script: ScriptExecutor,
    single_process: bool,
    event_wait: Duration,
    /// `[into script, into controller]`
    pumps: [JoinHandle<()>; 2],
    echo: JoinHandle<()>,
}

impl Session {
    pub fn start(
        config: &CefkitConfig,
        url: &str,
        event_wait: Duration,
    ) -> Result<Self, BridgeError> {
        let controller = Controller::start(config, url)?;
        let script = ScriptExecutor::start(config)?;

        let (to_script, from_controller) = mpsc::unbounded_channel();
        let (to_controller, from_script) = mpsc::unbounded_channel();
        link::attach(&controller.engine, to_script);
        link::attach(&script.engine, to_controller);
        let pumps = [
            tokio::spawn(link::pump(script.engine.clone(), from_controller)),
            tokio::spawn(link::pump(controller.engine.clone(), from_script)),
        ];
        let echo = tokio::spawn(echo_events(controller.endpoint.subscribe()));

        Ok(Self {
            controller,
            script,
            single_process: config.process.single_process,
            event_wait,
            pumps,
            echo,
        })
    }

    /// Bring up the main frame's context, evaluate `code` there and
    /// optionally raise an uncaught exception afterwards.
    pub async fn drive(&self, code: &str, throw: Option<&str>) -> Result<Value, RunError> {
        let mut events = self.controller.endpoint.subscribe();
        self.controller.engine.fire_context_initialized();
        self.script
            .engine
            .fire_context_created(BROWSER_ID, MAIN_FRAME_ID);

        let result = self.evaluate(&mut events, code).await;

        if let Some(message) = throw {
            let mut exception = ExceptionRecord::new(message);
            exception.line_number = 1;
            self.script
                .engine
                .fire_uncaught_exception(BROWSER_ID, MAIN_FRAME_ID, &exception, &[]);
            if !self.single_process {
                self.wait_for(&mut events, |e| {
                    matches!(e, ProtocolEvent::UncaughtException { .. })
                })
                .await;
            }
        }
        result
    }

    async fn evaluate(
        &self,
        events: &mut broadcast::Receiver<ProtocolEvent>,
        code: &str,
    ) -> Result<Value, RunError> {
        if self.single_process {
            tracing::info!("single-process mode, evaluating in place");
            return self.evaluate_in_place(code);
        }
        let announced = self
            .wait_for(events, |e| matches!(e, ProtocolEvent::ContextCreated { .. }))
            .await;
        if !announced {
            return Err(RunError::NoContext);
        }
        self.controller
            .endpoint
            .evaluate(&self.controller.browser, FrameId(MAIN_FRAME_ID), code)
            .await
            .map_err(RunError::from)
    }

    fn evaluate_in_place(&self, code: &str) -> Result<Value, RunError> {
        let frame = self.script.browser.main_frame().ok_or(RunError::NoContext)?;
        let context = frame.v8_context().ok_or(RunError::NoContext)?;
        context.enter();
        let result = context.eval(code, None, 1);
        context.exit();
        result.map_err(RunError::Script)
    }

    async fn wait_for(
        &self,
        events: &mut broadcast::Receiver<ProtocolEvent>,
        mut wanted: impl FnMut(&ProtocolEvent) -> bool,
    ) -> bool {
        let wait = async {
            loop {
                match events.recv().await {
                    Ok(event) if wanted(&event) => return true,
                    Ok(_) | Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => return false,
                }
            }
        };
        tokio::time::timeout(self.event_wait, wait)
            .await
            .unwrap_or(false)
    }

    /// Release the main frame's context, close both browsers and stop the
    /// link tasks. Runs on every exit path of a session.
    pub async fn close(self) {
        self.script
            .engine
            .fire_context_released(BROWSER_ID, MAIN_FRAME_ID);
        self.controller.shutdown();
        self.script.shutdown();
        // Let the pumps drain what shutdown queued before stopping them.
        tokio::task::yield_now().await;
        for pump in &self.pumps {
            pump.abort();
        }
        self.echo.abort();
    }
}

async fn echo_events(mut events: broadcast::Receiver<ProtocolEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(line) => eprintln!("{line}"),
                Err(e) => tracing::warn!(error = %e, "event not serializable"),
            },
            Err(RecvError::Lagged(n)) => tracing::warn!(skipped = n, "event echo lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    const SHORT_WAIT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn evaluates_across_the_link() {
        let session = Session::start(&CefkitConfig::default(), "about:blank", SHORT_WAIT * 20)
            .unwrap();
        let value = session.drive("1+1", None).await.unwrap();
        assert_eq!(value, Value::Int(2));
        session.close().await;
    }

    #[tokio::test]
    async fn missing_context_still_tears_down() {
        let session = Session::start(&CefkitConfig::default(), "about:blank", SHORT_WAIT).unwrap();
        // Nothing reaches the controller, so the context is never announced.
        session.pumps[1].abort();
        let controller_engine = Arc::clone(&session.controller.engine);
        let script_engine = Arc::clone(&session.script.engine);

        let result = session.drive("1+1", None).await;
        assert!(matches!(result, Err(RunError::NoContext)));

        session.close().await;
        assert!(controller_engine.browser(BROWSER_ID).is_null());
        assert!(script_engine.browser(BROWSER_ID).is_null());
        assert_eq!(controller_engine.over_releases(), 0);
        assert_eq!(script_engine.over_releases(), 0);
    }
}
