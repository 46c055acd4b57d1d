//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from `.env` and environment variables.
//! Every value has a default so the service can start with an empty environment
//! (in-memory store, strict tokens, 30 second windows).
//!
//! Tests override single fields through the per-field setters and restore the
//! environment state with [`AppConfig::reset`].

use std::env;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock, RwLockReadGuard};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub host: String,
    pub port: u16,

    /// `memory`, `sqlite` or `sheets`.
    pub store_backend: String,
    pub database_path: String,
    pub sheets_api_base: String,
    pub sheets_spreadsheet_id: String,
    pub sheets_worksheet: String,
    pub sheets_access_token: String,
    pub store_timeout_ms: u64,
    pub roster_path: String,

    /// Bearer key for lecturer routes. Empty disables the guard.
    pub lecturer_key: String,
    pub public_base_url: String,

    pub window_seconds: i64,
    pub strict_tokens: bool,

    pub student_id_header: String,
    pub name_header: String,
    pub group_header: String,
    pub session_prefix: String,
    pub time_column_prefix: String,
    pub presence_mark: String,
    pub timestamp_offset_hours: i64,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn flag_or(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: var_or("APP_ENV", "development"),
            project_name: var_or("PROJECT_NAME", "roll-call"),
            log_level: var_or("LOG_LEVEL", "api=info,services=info,db=info"),
            log_file: var_or("LOG_FILE", "api.log"),
            log_to_stdout: flag_or("LOG_TO_STDOUT", false),
            host: var_or("HOST", "127.0.0.1"),
            port: parse_or("PORT", 3000),

            store_backend: var_or("STORE_BACKEND", "memory"),
            database_path: var_or("DATABASE_PATH", "data/attendance.db"),
            sheets_api_base: var_or(
                "SHEETS_API_BASE",
                "https://sheets.googleapis.com/v4/spreadsheets",
            ),
            sheets_spreadsheet_id: var_or("SHEETS_SPREADSHEET_ID", ""),
            sheets_worksheet: var_or("SHEETS_WORKSHEET", "Sheet1"),
            sheets_access_token: var_or("SHEETS_ACCESS_TOKEN", ""),
            store_timeout_ms: parse_or("STORE_TIMEOUT_MS", 5000),
            roster_path: var_or("ROSTER_PATH", ""),

            lecturer_key: var_or("LECTURER_KEY", ""),
            public_base_url: var_or("PUBLIC_BASE_URL", "http://127.0.0.1:3000/"),

            window_seconds: parse_or("TOKEN_WINDOW_SECONDS", 30).clamp(1, 3600),
            strict_tokens: flag_or("STRICT_TOKENS", true),

            student_id_header: var_or("STUDENT_ID_HEADER", "Student ID"),
            name_header: var_or("NAME_HEADER", "Name"),
            group_header: var_or("GROUP_HEADER", "Group"),
            session_prefix: var_or("SESSION_PREFIX", "Session "),
            time_column_prefix: var_or("TIME_COLUMN_PREFIX", "time:"),
            presence_mark: var_or("PRESENCE_MARK", "✅"),
            timestamp_offset_hours: parse_or("TIMESTAMP_OFFSET_HOURS", 7),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// A poisoned lock is recovered; configuration values are plain data.
    pub fn global() -> RwLockReadGuard<'static, AppConfig> {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resets the configuration by reloading from environment variables.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().unwrap_or_else(|p| p.into_inner());
            *guard = AppConfig::from_env();
        }
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock.write().unwrap_or_else(|p| p.into_inner());
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_store_backend(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.store_backend = value.into());
    }

    pub fn set_store_timeout_ms(value: u64) {
        AppConfig::set_field(|cfg| cfg.store_timeout_ms = value);
    }

    pub fn set_lecturer_key(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.lecturer_key = value.into());
    }

    pub fn set_public_base_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.public_base_url = value.into());
    }

    pub fn set_window_seconds(value: i64) {
        AppConfig::set_field(|cfg| cfg.window_seconds = value.max(1));
    }

    pub fn set_strict_tokens(value: bool) {
        AppConfig::set_field(|cfg| cfg.strict_tokens = value);
    }
}

// --- Free getters, mirroring the field names ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn store_backend() -> String {
    AppConfig::global().store_backend.clone()
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn store_timeout_ms() -> u64 {
    AppConfig::global().store_timeout_ms
}

pub fn roster_path() -> String {
    AppConfig::global().roster_path.clone()
}

pub fn lecturer_key() -> String {
    AppConfig::global().lecturer_key.clone()
}

pub fn public_base_url() -> String {
    AppConfig::global().public_base_url.clone()
}

pub fn window_seconds() -> i64 {
    AppConfig::global().window_seconds
}

pub fn strict_tokens() -> bool {
    AppConfig::global().strict_tokens
}
