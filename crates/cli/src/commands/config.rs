use std::env;
use std::fs;
use std::path::Path;

use mymove_core::config::{detect_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let fixtures_path = config
        .data
        .fixtures_path
        .as_ref()
        .map_or_else(|| "<unset>".to_string(), |path| path.display().to_string());

    let lines = [
        "effective config (source precedence: env > file > default):".to_string(),
        render_line(
            "server.bind_address",
            &config.server.bind_address,
            source("server.bind_address", &["MYMOVE_SERVER_BIND_ADDRESS"]),
        ),
        render_line(
            "server.port",
            &config.server.port.to_string(),
            source("server.port", &["MYMOVE_SERVER_PORT"]),
        ),
        render_line(
            "server.graceful_shutdown_secs",
            &config.server.graceful_shutdown_secs.to_string(),
            source("server.graceful_shutdown_secs", &["MYMOVE_SERVER_GRACEFUL_SHUTDOWN_SECS"]),
        ),
        render_line(
            "data.fixtures_path",
            &fixtures_path,
            source("data.fixtures_path", &["MYMOVE_DATA_FIXTURES_PATH"]),
        ),
        render_line(
            "wizard.session_header",
            &config.wizard.session_header,
            source("wizard.session_header", &["MYMOVE_WIZARD_SESSION_HEADER"]),
        ),
        render_line(
            "wizard.max_sessions",
            &config.wizard.max_sessions.to_string(),
            source("wizard.max_sessions", &["MYMOVE_WIZARD_MAX_SESSIONS"]),
        ),
        render_line(
            "wizard.session_idle_secs",
            &config.wizard.session_idle_secs.to_string(),
            source("wizard.session_idle_secs", &["MYMOVE_WIZARD_SESSION_IDLE_SECS"]),
        ),
        render_line(
            "logging.level",
            &config.logging.level,
            source("logging.level", &["MYMOVE_LOGGING_LEVEL", "MYMOVE_LOG_LEVEL"]),
        ),
        render_line(
            "logging.format",
            &format!("{:?}", config.logging.format),
            source("logging.format", &["MYMOVE_LOGGING_FORMAT", "MYMOVE_LOG_FORMAT"]),
        ),
    ];

    CommandResult::success("config", lines.join("\n"))
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
