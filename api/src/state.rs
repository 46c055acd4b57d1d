use anyhow::Context;
use chrono::{DateTime, Utc};
use db::row_store::{
    DynRowStore, MemoryRowStore, SeaOrmRowStore, SheetsRowStore, sheets::SheetsConfig,
};
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use services::display::{Clock, DisplayConfig, DisplayRegistry, system_clock};
use services::{AttendanceRecorder, SheetLayout, TokenPolicy};
use std::sync::Arc;
use std::time::Duration;
use util::config::{self, AppConfig};
use util::ws::WebSocketManager;

/// Everything a request handler needs, cloned cheaply into every route.
#[derive(Clone)]
pub struct AppState {
    recorder: Arc<AttendanceRecorder>,
    policy: TokenPolicy,
    ws: WebSocketManager,
    displays: DisplayRegistry,
    clock: Clock,
    public_base_url: String,
    lecturer_key: Option<String>,
}

impl AppState {
    /// Builds the state around `store` using the global configuration.
    pub fn new(store: DynRowStore) -> Self {
        let cfg = AppConfig::global().clone();
        let recorder = AttendanceRecorder::new(
            store,
            SheetLayout::from_config(&cfg),
            Duration::from_millis(cfg.store_timeout_ms),
        );
        Self {
            recorder: Arc::new(recorder),
            policy: TokenPolicy::new(cfg.window_seconds, cfg.strict_tokens),
            ws: WebSocketManager::new(),
            displays: DisplayRegistry::new(),
            clock: system_clock(),
            public_base_url: cfg.public_base_url,
            lecturer_key: Some(cfg.lecturer_key).filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: TokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_lecturer_key(mut self, key: Option<String>) -> Self {
        self.lecturer_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn recorder(&self) -> &AttendanceRecorder {
        &self.recorder
    }

    pub fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    pub fn ws(&self) -> &WebSocketManager {
        &self.ws
    }

    pub fn ws_clone(&self) -> WebSocketManager {
        self.ws.clone()
    }

    pub fn displays(&self) -> &DisplayRegistry {
        &self.displays
    }

    pub fn clock(&self) -> Clock {
        self.clock.clone()
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    pub fn lecturer_key(&self) -> Option<&str> {
        self.lecturer_key.as_deref()
    }

    /// Display loop settings derived from the token policy.
    pub fn display_config(&self) -> DisplayConfig {
        DisplayConfig::new(self.policy.window_seconds, self.public_base_url.clone())
    }
}

/// Opens the Row Store selected by `STORE_BACKEND`.
pub async fn store_from_config() -> anyhow::Result<DynRowStore> {
    let backend = config::store_backend().to_lowercase();
    let store: DynRowStore = match backend.as_str() {
        "memory" => Arc::new(MemoryRowStore::new()),
        "sqlite" => {
            let db = db::connect()
                .await
                .context("failed to open the sqlite sheet database")?;
            Migrator::up(&db, None)
                .await
                .context("failed to migrate the sqlite sheet database")?;
            Arc::new(SeaOrmRowStore::new(db))
        }
        "sheets" => {
            let cfg = AppConfig::global().clone();
            anyhow::ensure!(
                !cfg.sheets_spreadsheet_id.trim().is_empty(),
                "SHEETS_SPREADSHEET_ID must be set for the sheets backend"
            );
            let store = SheetsRowStore::new(SheetsConfig {
                api_base: cfg.sheets_api_base,
                spreadsheet_id: cfg.sheets_spreadsheet_id,
                worksheet: cfg.sheets_worksheet,
                access_token: cfg.sheets_access_token,
                timeout: Duration::from_millis(cfg.store_timeout_ms),
            })?;
            Arc::new(store)
        }
        other => anyhow::bail!("unknown STORE_BACKEND '{other}' (expected memory, sqlite or sheets)"),
    };
    tracing::info!(backend = %backend, "row store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn memory_backend_is_the_default() {
        AppConfig::reset();
        AppConfig::set_store_backend("memory");
        let store = store_from_config().await.unwrap();
        assert!(store.header_row().await.unwrap().is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn unknown_backend_is_rejected() {
        AppConfig::reset();
        AppConfig::set_store_backend("excel");
        let err = store_from_config().await.err().unwrap();
        assert!(err.to_string().contains("excel"));
        AppConfig::reset();
    }

    #[tokio::test]
    #[serial]
    async fn blank_lecturer_key_disables_the_guard() {
        AppConfig::reset();
        let state = AppState::new(Arc::new(MemoryRowStore::new()))
            .with_lecturer_key(Some("  ".into()));
        assert_eq!(state.lecturer_key(), None);
        let state = state.with_lecturer_key(Some("s3cret".into()));
        assert_eq!(state.lecturer_key(), Some("s3cret"));
    }
}
