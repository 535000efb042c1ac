use crate::config::{AtlasMnsConfig, Parameter};
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "atlasmns")]
#[command(about = "Check the AtlasMNS configuration and the services it points to")]
pub struct CheckArgs {
    /// Configuration file
    #[arg(short = 'c', long = "config-file")]
    pub config_file: Option<String>,

    /// Configuration file (positional form)
    #[arg(value_name = "CONFIG_FILE", conflicts_with = "config_file")]
    pub config_file_positional: Option<String>,

    /// Query the RIPE Atlas anchor list
    #[arg(long)]
    pub atlas: bool,

    /// Connect to the PostgreSQL scheduler database
    #[arg(long)]
    pub scheduler: bool,

    /// Connect to the MongoDB results database
    #[arg(long)]
    pub results: bool,

    /// Base URL of the RIPE Atlas API
    #[arg(long, default_value = crate::core::atlas::DEFAULT_ATLAS_BASE_URL)]
    pub atlas_url: String,

    /// Connection timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,

    /// Print the effective configuration (secrets masked)
    #[arg(long)]
    pub show_config: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl CheckArgs {
    pub fn config_path(&self) -> Option<&str> {
        self.config_file
            .as_deref()
            .or(self.config_file_positional.as_deref())
    }

    /// 未指定任何目標時全部檢查
    pub fn targets(&self) -> (bool, bool, bool) {
        if !self.atlas && !self.scheduler && !self.results {
            (true, true, true)
        } else {
            (self.atlas, self.scheduler, self.results)
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "atlasmns-trace-agent")]
#[command(about = "AtlasMNS trace agent bootstrap")]
pub struct AgentArgs {
    /// Set logging level (0=trace, 1=debug, 2=info, 3=warning, 4=error, 5=fatal)
    #[arg(long, default_value = "2")]
    pub loglevel: u32,

    /// Configuration file
    #[arg(short = 'c', long = "config-file")]
    pub config_file: Option<String>,

    /// Configuration file (positional form)
    #[arg(value_name = "CONFIG_FILE", conflicts_with = "config_file")]
    pub config_file_positional: Option<String>,

    /// Scheduler database server name
    #[arg(long = "scheduler_dbserver")]
    pub scheduler_dbserver: Option<String>,

    /// Scheduler database server port
    #[arg(long = "scheduler_dbport")]
    pub scheduler_dbport: Option<u16>,

    /// Scheduler database user name
    #[arg(long = "scheduler_dbuser")]
    pub scheduler_dbuser: Option<String>,

    /// Scheduler database password
    #[arg(long = "scheduler_dbpassword")]
    pub scheduler_dbpassword: Option<String>,

    /// Scheduler database name
    #[arg(long = "scheduler_database")]
    pub scheduler_database: Option<String>,

    /// Scheduler server CA file
    #[arg(long = "scheduler_cafile")]
    pub scheduler_cafile: Option<String>,

    /// Connect to the scheduler database after start-up
    #[arg(long)]
    pub check: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl AgentArgs {
    pub fn config_path(&self) -> Option<&str> {
        self.config_file
            .as_deref()
            .or(self.config_file_positional.as_deref())
    }

    /// 預設值 → 設定檔 → 命令列，最後檢查排程資料庫參數的型別
    pub fn resolve_configuration(&self) -> Result<AtlasMnsConfig> {
        let mut config = AtlasMnsConfig::default();
        if let Some(path) = self.config_path() {
            config.load_file(path)?;
        }
        self.apply_overrides(&mut config);
        config.scheduler_settings()?;
        Ok(config)
    }

    /// 命令列參數優先於設定檔
    pub fn apply_overrides(&self, config: &mut AtlasMnsConfig) {
        let overrides = [
            (Parameter::SchedulerDbServer, self.scheduler_dbserver.clone()),
            (
                Parameter::SchedulerDbPort,
                self.scheduler_dbport.map(|p| p.to_string()),
            ),
            (Parameter::SchedulerDbUser, self.scheduler_dbuser.clone()),
            (Parameter::SchedulerDbPassword, self.scheduler_dbpassword.clone()),
            (Parameter::SchedulerDatabase, self.scheduler_database.clone()),
            (Parameter::SchedulerCaFile, self.scheduler_cafile.clone()),
        ];

        for (parameter, value) in overrides {
            if let Some(value) = value {
                tracing::debug!("{} set on the command line", parameter);
                config.set(parameter, Some(value));
            }
        }
    }
}
