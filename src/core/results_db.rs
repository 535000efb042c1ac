use crate::domain::model::{CaMode, DatabaseSettings};
use crate::utils::error::Result;
use mongodb::bson::doc;
use mongodb::options::{AuthMechanism, ClientOptions, Credential, ServerAddress, Tls, TlsOptions};
use mongodb::{Client, Database};
use std::time::Duration;

pub const APPLICATION_NAME: &str = "atlasmns";

/// TLS 一律啟用；CA 模式只決定憑證如何驗證
pub fn tls_options(ca_mode: &CaMode) -> TlsOptions {
    match ca_mode {
        CaMode::Ignore => TlsOptions::builder().allow_invalid_certificates(true).build(),
        CaMode::DefaultTrust => TlsOptions::builder().build(),
        CaMode::CustomCaFile(path) => TlsOptions::builder().ca_file_path(path.clone()).build(),
    }
}

pub fn client_options(settings: &DatabaseSettings, timeout: Duration) -> ClientOptions {
    // 以結果資料庫本身作為驗證來源
    let credential = Credential::builder()
        .username(settings.user.clone())
        .password(settings.password.clone())
        .source(settings.database.clone())
        .mechanism(AuthMechanism::ScramSha1)
        .build();

    ClientOptions::builder()
        .hosts(vec![ServerAddress::Tcp {
            host: settings.host.clone(),
            port: Some(settings.port),
        }])
        .app_name(APPLICATION_NAME.to_string())
        .tls(Tls::Enabled(tls_options(&settings.ca_mode)))
        .credential(credential)
        .connect_timeout(timeout)
        .server_selection_timeout(timeout)
        .build()
}

/// 建立 MongoDB client 並以 `ping` 觸發連線與 SCRAM-SHA-1 驗證
pub async fn connect_results_db(settings: &DatabaseSettings, timeout: Duration) -> Result<Database> {
    if !settings.ca_mode.verifies_certificates() {
        tracing::warn!("TLS certificate check for MongoDB results database is turned off!");
    }

    let client = Client::with_options(client_options(settings, timeout))?;
    let database = client.database(&settings.database);
    database.run_command(doc! { "ping": 1 }).await?;
    tracing::debug!("Authenticated to results database {}", settings.database);
    Ok(database)
}
