use crate::config::{AtlasMnsConfig, LoadReport, Parameter};
use crate::core::atlas::{AtlasClient, DEFAULT_ATLAS_BASE_URL};
use crate::core::{results_db, scheduler_db};
use crate::domain::model::AnchorSummary;
use crate::utils::error::Result;
use mongodb::Database;
use sqlx::postgres::PgConnection;
use sqlx::Connection;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// 持有設定與兩個資料庫連線的輔助物件
///
/// 每個 `connect_*` / `load_configuration` 都會把錯誤記錄下來並回傳 `bool`；
/// 需要錯誤內容的呼叫端可改用對應的 `try_*` 版本。
pub struct AtlasMns {
    configuration: AtlasMnsConfig,
    connect_timeout: Duration,
    atlas_base_url: String,
    scheduler_db: Option<PgConnection>,
    results_db: Option<Database>,
}

impl Default for AtlasMns {
    fn default() -> Self {
        Self::new()
    }
}

impl AtlasMns {
    pub fn new() -> Self {
        Self::with_configuration(AtlasMnsConfig::default())
    }

    pub fn with_configuration(configuration: AtlasMnsConfig) -> Self {
        Self {
            configuration,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            atlas_base_url: DEFAULT_ATLAS_BASE_URL.to_string(),
            scheduler_db: None,
            results_db: None,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_atlas_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.atlas_base_url = base_url.into();
        self
    }

    pub fn configuration(&self) -> &AtlasMnsConfig {
        &self.configuration
    }

    pub fn scheduler_db(&mut self) -> Option<&mut PgConnection> {
        self.scheduler_db.as_mut()
    }

    pub fn results_db(&self) -> Option<&Database> {
        self.results_db.as_ref()
    }

    pub fn load_configuration<P: AsRef<Path>>(&mut self, path: P) -> bool {
        match self.try_load_configuration(&path) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    "Unable to read configuration file {}: {}",
                    path.as_ref().display(),
                    e
                );
                false
            }
        }
    }

    pub fn try_load_configuration<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
        let report = self.configuration.load_file(&path)?;
        tracing::debug!(
            "Loaded {} parameter(s) from {} ({} ignored)",
            report.applied.len(),
            path.as_ref().display(),
            report.ignored.len()
        );
        Ok(report)
    }

    pub async fn connect_to_ripe_atlas(&self) -> bool {
        match self.try_connect_to_ripe_atlas().await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Unable to connect to the RIPE Atlas server: {}", e);
                false
            }
        }
    }

    pub async fn try_connect_to_ripe_atlas(&self) -> Result<AnchorSummary> {
        tracing::info!("Connecting to the RIPE Atlas server ...");
        let client = AtlasClient::new(
            &self.atlas_base_url,
            self.configuration.atlas_api_key(),
            self.connect_timeout,
        )?;
        let summary = client.fetch_anchors().await?;
        if let Some(count) = summary.count {
            tracing::info!("RIPE Atlas reachable, {} anchors listed", count);
        }
        Ok(summary)
    }

    pub async fn connect_to_scheduler_db(&mut self) -> bool {
        match self.try_connect_to_scheduler_db().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    "Unable to connect to the PostgreSQL scheduler database at {}: {}",
                    self.configuration
                        .get(Parameter::SchedulerDbServer)
                        .unwrap_or("<unset>"),
                    e
                );
                false
            }
        }
    }

    pub async fn try_connect_to_scheduler_db(&mut self) -> Result<()> {
        self.scheduler_db = None;
        let settings = self.configuration.scheduler_settings()?;
        tracing::info!(
            "Connecting to the PostgreSQL scheduler database at {} ...",
            settings.host
        );
        let connection = scheduler_db::connect_scheduler_db(&settings, self.connect_timeout).await?;
        self.scheduler_db = Some(connection);
        Ok(())
    }

    pub async fn connect_to_results_db(&mut self) -> bool {
        match self.try_connect_to_results_db().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    "Unable to connect to the MongoDB results database at {}: {}",
                    self.configuration
                        .get(Parameter::ResultsDbServer)
                        .unwrap_or("<unset>"),
                    e
                );
                false
            }
        }
    }

    pub async fn try_connect_to_results_db(&mut self) -> Result<()> {
        self.results_db = None;
        let settings = self.configuration.results_settings()?;
        tracing::info!("Connecting to MongoDB results database at {} ...", settings.host);
        let database = results_db::connect_results_db(&settings, self.connect_timeout).await?;
        self.results_db = Some(database);
        Ok(())
    }

    /// 關閉 PostgreSQL 連線；MongoDB client 在 drop 時自行釋放
    pub async fn close(mut self) -> Result<()> {
        if let Some(connection) = self.scheduler_db.take() {
            connection.close().await?;
        }
        self.results_db = None;
        Ok(())
    }
}
