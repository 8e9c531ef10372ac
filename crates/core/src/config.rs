use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub wizard: WizardConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct DataConfig {
    pub fixtures_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct WizardConfig {
    pub session_header: String,
    pub max_sessions: usize,
    /// Sessions untouched for this long are dropped.
    pub session_idle_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub fixtures_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const DEFAULT_CONFIG_FILE: &str = "mymove.toml";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            data: DataConfig { fixtures_path: None },
            wizard: WizardConfig {
                session_header: "x-wizard-session".to_string(),
                max_sessions: 10_000,
                session_idle_secs: 1_800,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(data) = patch.data {
            if let Some(fixtures_path) = data.fixtures_path {
                self.data.fixtures_path = Some(fixtures_path);
            }
        }

        if let Some(wizard) = patch.wizard {
            if let Some(session_header) = wizard.session_header {
                self.wizard.session_header = session_header;
            }
            if let Some(max_sessions) = wizard.max_sessions {
                self.wizard.max_sessions = max_sessions;
            }
            if let Some(session_idle_secs) = wizard.session_idle_secs {
                self.wizard.session_idle_secs = session_idle_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("MYMOVE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("MYMOVE_SERVER_PORT") {
            self.server.port = parse_u16("MYMOVE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("MYMOVE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("MYMOVE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("MYMOVE_DATA_FIXTURES_PATH") {
            self.data.fixtures_path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("MYMOVE_WIZARD_SESSION_HEADER") {
            self.wizard.session_header = value;
        }
        if let Some(value) = read_env("MYMOVE_WIZARD_MAX_SESSIONS") {
            self.wizard.max_sessions = parse_usize("MYMOVE_WIZARD_MAX_SESSIONS", &value)?;
        }
        if let Some(value) = read_env("MYMOVE_WIZARD_SESSION_IDLE_SECS") {
            self.wizard.session_idle_secs =
                parse_u64("MYMOVE_WIZARD_SESSION_IDLE_SECS", &value)?;
        }

        let log_level = read_env("MYMOVE_LOGGING_LEVEL").or_else(|| read_env("MYMOVE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("MYMOVE_LOGGING_FORMAT").or_else(|| read_env("MYMOVE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(fixtures_path) = overrides.fixtures_path {
            self.data.fixtures_path = Some(fixtures_path);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_data(&self.data)?;
        validate_wizard(&self.wizard)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

/// The config file that `AppConfig::load` would read, if any.
pub fn detect_config_path() -> Option<PathBuf> {
    resolve_config_path(None)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 || server.graceful_shutdown_secs > 300 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_data(data: &DataConfig) -> Result<(), ConfigError> {
    if let Some(path) = &data.fixtures_path {
        if !path.is_file() {
            return Err(ConfigError::Validation(format!(
                "data.fixtures_path `{}` does not point to a readable file",
                path.display()
            )));
        }
    }

    Ok(())
}

fn validate_wizard(wizard: &WizardConfig) -> Result<(), ConfigError> {
    let header = wizard.session_header.as_str();
    let valid_header = !header.is_empty()
        && header
            .bytes()
            .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-');
    if !valid_header {
        return Err(ConfigError::Validation(
            "wizard.session_header must be a lowercase HTTP header name (a-z, 0-9, `-`)"
                .to_string(),
        ));
    }

    if wizard.max_sessions == 0 {
        return Err(ConfigError::Validation(
            "wizard.max_sessions must be greater than zero".to_string(),
        ));
    }

    if wizard.session_idle_secs == 0 {
        return Err(ConfigError::Validation(
            "wizard.session_idle_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    data: Option<DataPatch>,
    wizard: Option<WizardPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct DataPatch {
    fixtures_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct WizardPatch {
    session_header: Option<String>,
    max_sessions: Option<usize>,
    session_idle_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid_without_any_source() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.server.port == 8080, "default port should be 8080")?;
        ensure(config.wizard.session_header == "x-wizard-session", "default session header")?;
        ensure(config.data.fixtures_path.is_none(), "no fixtures by default")?;
        ensure(config.wizard.session_idle_secs == 1_800, "sessions idle out after 30 minutes")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "compact logs by default")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_MYMOVE_BIND", "0.0.0.0");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("mymove.toml");
            fs::write(
                &path,
                r#"
[server]
bind_address = "${TEST_MYMOVE_BIND}"
port = 9090
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.server.bind_address == "0.0.0.0",
                "bind address should be interpolated from environment",
            )?;
            ensure(config.server.port == 9090, "port should come from the file")
        })();

        clear_vars(&["TEST_MYMOVE_BIND"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("MYMOVE_LOG_LEVEL", "warn");
        env::set_var("MYMOVE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&["MYMOVE_LOG_LEVEL", "MYMOVE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("MYMOVE_SERVER_PORT", "7070");
        env::set_var("MYMOVE_WIZARD_MAX_SESSIONS", "25");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("mymove.toml");
            fs::write(
                &path,
                r#"
[server]
port = 6060
bind_address = "10.0.0.1"

[wizard]
max_sessions = 5

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    bind_address: Some("192.168.1.1".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.server.bind_address == "192.168.1.1", "override bind address wins")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.server.port == 7070, "env port should win over file and defaults")?;
            ensure(config.wizard.max_sessions == 25, "env session cap should win over file")
        })();

        clear_vars(&["MYMOVE_SERVER_PORT", "MYMOVE_WIZARD_MAX_SESSIONS"]);
        result
    }

    #[test]
    fn invalid_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("MYMOVE_SERVER_PORT", "eighty");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected invalid port override to fail".to_string()),
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "MYMOVE_SERVER_PORT", "error should name the variable")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
        };

        clear_vars(&["MYMOVE_SERVER_PORT"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("MYMOVE_WIZARD_SESSION_HEADER", "X Wizard Session");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("wizard.session_header")
            );
            ensure(has_message, "validation failure should mention wizard.session_header")
        })();

        clear_vars(&["MYMOVE_WIZARD_SESSION_HEADER"]);
        result
    }

    #[test]
    fn session_idle_timeout_must_be_positive() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("MYMOVE_WIZARD_SESSION_IDLE_SECS", "0");
        let result = AppConfig::load(LoadOptions::default());
        clear_vars(&["MYMOVE_WIZARD_SESSION_IDLE_SECS"]);

        let has_message = matches!(
            result,
            Err(ConfigError::Validation(ref message)) if message.contains("session_idle_secs")
        );
        ensure(has_message, "validation failure should mention wizard.session_idle_secs")
    }

    #[test]
    fn missing_fixture_file_fails_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                fixtures_path: Some("/definitely/not/here/moves.json".into()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let has_message = matches!(
            result,
            Err(ConfigError::Validation(ref message)) if message.contains("data.fixtures_path")
        );
        ensure(has_message, "validation failure should mention data.fixtures_path")
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let result = AppConfig::load(LoadOptions {
            config_path: Some("/definitely/not/here/mymove.toml".into()),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should be reported",
        )
    }
}
