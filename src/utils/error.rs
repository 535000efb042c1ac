use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtlasMnsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration parse error at line {line}: {message}")]
    ConfigParseError { line: usize, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Scheduler database error: {0}")]
    SchedulerDbError(#[from] sqlx::Error),

    #[error("Results database error: {0}")]
    ResultsDbError(#[from] mongodb::error::Error),

    #[error("RIPE Atlas request failed: {0}")]
    AtlasRequestError(#[from] reqwest::Error),

    #[error("RIPE Atlas returned HTTP {status}")]
    AtlasStatusError { status: u16 },

    #[error("Timed out after {seconds}s connecting to {target}")]
    TimeoutError { target: String, seconds: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Connection,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AtlasMnsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError(_) => ErrorCategory::Io,
            Self::ConfigParseError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::SchedulerDbError(_)
            | Self::ResultsDbError(_)
            | Self::AtlasRequestError(_)
            | Self::AtlasStatusError { .. }
            | Self::TimeoutError { .. } => ErrorCategory::Connection,
        }
    }

    /// 連線類錯誤通常可以稍後重試，設定錯誤則必須先修正檔案
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AtlasStatusError { status } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            Self::AtlasRequestError(_)
            | Self::SchedulerDbError(_)
            | Self::ResultsDbError(_)
            | Self::TimeoutError { .. } => ErrorSeverity::Medium,
            Self::AtlasStatusError { .. } => ErrorSeverity::High,
            Self::ConfigParseError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::IoError(_) => "Check that the configuration file exists and is readable",
            Self::ConfigParseError { .. } => {
                "Use one 'key = value' entry per line and do not repeat keys"
            }
            Self::InvalidConfigValueError { .. } | Self::MissingConfigError { .. } => {
                "Fix the named parameter in the configuration file"
            }
            Self::SchedulerDbError(_) => {
                "Check scheduler_dbserver, credentials and scheduler_cafile"
            }
            Self::ResultsDbError(_) => "Check results_dbserver, credentials and results_cafile",
            Self::AtlasRequestError(_) => "Check network connectivity to the RIPE Atlas API",
            Self::AtlasStatusError { .. } => "Check atlas_api_key and the RIPE Atlas service status",
            Self::TimeoutError { .. } => "Check that the server is reachable from this host",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Connection => format!("Connection failed: {}", self),
            ErrorCategory::Io => format!("File access failed: {}", self),
        }
    }

    /// 依嚴重程度決定行程結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, AtlasMnsError>;
