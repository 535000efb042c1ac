use std::fmt;
use std::path::PathBuf;

/// `*_cafile` 中代表「不檢查 TLS 憑證」的值
pub const CA_MODE_IGNORE: &str = "IGNORE";
/// `*_cafile` 中代表「使用系統預設信任庫」的值
pub const CA_MODE_DEFAULT: &str = "None";

/// 每個連線各自的 TLS 信任設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaMode {
    Ignore,
    DefaultTrust,
    CustomCaFile(PathBuf),
}

impl CaMode {
    /// `"IGNORE"` 關閉驗證，`"None"` 或未設定使用預設信任庫，其餘值視為 CA 檔路徑
    pub fn from_config_value(value: Option<&str>) -> Self {
        match value {
            Some(CA_MODE_IGNORE) => CaMode::Ignore,
            Some(CA_MODE_DEFAULT) | None => CaMode::DefaultTrust,
            Some(path) => CaMode::CustomCaFile(PathBuf::from(path)),
        }
    }

    pub fn verifies_certificates(&self) -> bool {
        !matches!(self, CaMode::Ignore)
    }
}

impl fmt::Display for CaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaMode::Ignore => write!(f, "{}", CA_MODE_IGNORE),
            CaMode::DefaultTrust => write!(f, "{}", CA_MODE_DEFAULT),
            CaMode::CustomCaFile(path) => write!(f, "{}", path.display()),
        }
    }
}

/// 從設定對應表推導出的單一資料庫連線參數
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub ca_mode: CaMode,
}

// 密碼不得出現在日誌中
impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("database", &self.database)
            .field("ca_mode", &self.ca_mode)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorSummary {
    pub status: u16,
    pub count: Option<u64>,
}
