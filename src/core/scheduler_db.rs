use crate::domain::model::{CaMode, DatabaseSettings};
use crate::utils::error::{AtlasMnsError, Result};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::ConnectOptions;
use std::time::Duration;

pub const APPLICATION_NAME: &str = "atlasmns";

/// 依 CA 模式組出 PostgreSQL 連線參數
///
/// - `Ignore`：要求 TLS 但不驗證憑證 (`sslmode=require`)
/// - `DefaultTrust`：`sslmode=verify-ca`，使用預設信任庫
/// - `CustomCaFile`：`sslmode=verify-ca`，並以指定檔案作為 root cert
pub fn connect_options(settings: &DatabaseSettings) -> PgConnectOptions {
    let mut options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .database(&settings.database)
        .application_name(APPLICATION_NAME);

    if let Some(password) = &settings.password {
        options = options.password(password);
    }

    match &settings.ca_mode {
        CaMode::Ignore => options.ssl_mode(PgSslMode::Require),
        CaMode::DefaultTrust => options.ssl_mode(PgSslMode::VerifyCa),
        CaMode::CustomCaFile(path) => options.ssl_mode(PgSslMode::VerifyCa).ssl_root_cert(path),
    }
}

pub async fn connect_scheduler_db(
    settings: &DatabaseSettings,
    timeout: Duration,
) -> Result<PgConnection> {
    if !settings.ca_mode.verifies_certificates() {
        tracing::warn!("TLS certificate check for PostgreSQL scheduler database is turned off!");
    }

    let options = connect_options(settings);
    match tokio::time::timeout(timeout, options.connect()).await {
        Ok(connection) => Ok(connection?),
        Err(_) => Err(AtlasMnsError::TimeoutError {
            target: format!("PostgreSQL scheduler database at {}", settings.host),
            seconds: timeout.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings(ca_mode: CaMode) -> DatabaseSettings {
        DatabaseSettings {
            host: "pg.example.net".to_string(),
            port: 6432,
            user: "scheduler".to_string(),
            password: Some("pw".to_string()),
            database: "atlasmnsdb".to_string(),
            ca_mode,
        }
    }

    #[test]
    fn test_connect_options_carry_settings() {
        let options = connect_options(&settings(CaMode::DefaultTrust));

        assert_eq!(options.get_host(), "pg.example.net");
        assert_eq!(options.get_port(), 6432);
        assert_eq!(options.get_username(), "scheduler");
        assert_eq!(options.get_database(), Some("atlasmnsdb"));
        assert_eq!(options.get_application_name(), Some(APPLICATION_NAME));
    }

    #[test]
    fn test_ssl_mode_follows_ca_mode() {
        let ignore = connect_options(&settings(CaMode::Ignore));
        assert!(matches!(ignore.get_ssl_mode(), PgSslMode::Require));

        let default_trust = connect_options(&settings(CaMode::DefaultTrust));
        assert!(matches!(default_trust.get_ssl_mode(), PgSslMode::VerifyCa));

        let custom = connect_options(&settings(CaMode::CustomCaFile(PathBuf::from(
            "/etc/ssl/scheduler-ca.pem",
        ))));
        assert!(matches!(custom.get_ssl_mode(), PgSslMode::VerifyCa));
    }

    #[test]
    fn test_custom_ca_file_becomes_root_cert() {
        let custom = connect_options(&settings(CaMode::CustomCaFile(PathBuf::from(
            "/etc/ssl/scheduler-ca.pem",
        ))));
        assert!(format!("{:?}", custom).contains("/etc/ssl/scheduler-ca.pem"));

        let default_trust = connect_options(&settings(CaMode::DefaultTrust));
        assert!(!format!("{:?}", default_trust).contains("/etc/ssl/scheduler-ca.pem"));
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut closed = settings(CaMode::Ignore);
        closed.host = "127.0.0.1".to_string();
        closed.port = port;

        let result = connect_scheduler_db(&closed, Duration::from_secs(5)).await;
        assert!(result.is_err());
    }
}
