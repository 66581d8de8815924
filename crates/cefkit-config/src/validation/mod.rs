//! Configuration validation.
//!
//! Each check pushes onto a shared error list; the orchestrator joins them
//! into a single `ConfigError`.

mod helpers;


use crate::schema::CefkitConfig;
use cefkit_common::ConfigError;

use helpers::check_range;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &CefkitConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_process(&mut errors, config);
    validate_protocol(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_process(errors: &mut Vec<String>, config: &CefkitConfig) {
    check_range(
        errors,
        "process.uncaught_exception_stack_size",
        config.process.uncaught_exception_stack_size,
        0,
        100,
    );

    if let Some(path) = &config.process.browser_subprocess_path {
        if path.trim().is_empty() {
            errors.push("process.browser_subprocess_path must not be empty".into());
        }
    }
}

fn validate_protocol(errors: &mut Vec<String>, config: &CefkitConfig) {
    check_range(
        errors,
        "protocol.pending_request_capacity",
        config.protocol.pending_request_capacity,
        1,
        65_536,
    );
    check_range(
        errors,
        "protocol.evaluate_timeout_ms",
        config.protocol.evaluate_timeout_ms,
        1,
        600_000,
    );

    if config.process.single_process && config.protocol.focused_node_notifications {
        errors.push(
            "protocol.focused_node_notifications has no effect with process.single_process".into(),
        );
    }
}
