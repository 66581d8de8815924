//! Default TOML config template with inline documentation comments.

pub(crate) fn default_config_toml() -> &'static str {
    r##"# cefkit configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[process]
# Run browser and renderer in one process. Disables cross-process routing.
single_process = false
# Stack frames captured for uncaught exceptions. 0 disables the
# on-uncaught-exception notification.
uncaught_exception_stack_size = 10     # 0-100
# browser_subprocess_path = "/path/to/helper"

[protocol]
# Forward focused-node-changed messages to the controller.
focused_node_notifications = false
pending_request_capacity = 1024        # 1-65536
evaluate_timeout_ms = 5000             # 1-600000

[logging]
# trace | debug | info | warn | error
level = "info"
"##
}
