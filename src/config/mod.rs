#[cfg(feature = "cli")]
pub mod cli;
pub mod parser;

use crate::domain::model::{CaMode, DatabaseSettings};
use crate::utils::error::Result;
use crate::utils::validation::{parse_port, validate_non_empty_string, validate_required_field, Validate};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// 設定檔認得的參數名稱（大小寫敏感）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Parameter {
    SchedulerDbServer,
    SchedulerDbPort,
    SchedulerDbUser,
    SchedulerDbPassword,
    SchedulerDatabase,
    SchedulerCaFile,
    ResultsDbServer,
    ResultsDbPort,
    ResultsDbUser,
    ResultsDbPassword,
    ResultsDatabase,
    ResultsCaFile,
    AtlasApiKey,
}

impl Parameter {
    pub const ALL: [Parameter; 13] = [
        Parameter::SchedulerDbServer,
        Parameter::SchedulerDbPort,
        Parameter::SchedulerDbUser,
        Parameter::SchedulerDbPassword,
        Parameter::SchedulerDatabase,
        Parameter::SchedulerCaFile,
        Parameter::ResultsDbServer,
        Parameter::ResultsDbPort,
        Parameter::ResultsDbUser,
        Parameter::ResultsDbPassword,
        Parameter::ResultsDatabase,
        Parameter::ResultsCaFile,
        Parameter::AtlasApiKey,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Parameter::SchedulerDbServer => "scheduler_dbserver",
            Parameter::SchedulerDbPort => "scheduler_dbport",
            Parameter::SchedulerDbUser => "scheduler_dbuser",
            Parameter::SchedulerDbPassword => "scheduler_dbpassword",
            Parameter::SchedulerDatabase => "scheduler_database",
            Parameter::SchedulerCaFile => "scheduler_cafile",
            Parameter::ResultsDbServer => "results_dbserver",
            Parameter::ResultsDbPort => "results_dbport",
            Parameter::ResultsDbUser => "results_dbuser",
            Parameter::ResultsDbPassword => "results_dbpassword",
            Parameter::ResultsDatabase => "results_database",
            Parameter::ResultsCaFile => "results_cafile",
            Parameter::AtlasApiKey => "atlas_api_key",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn default_value(self) -> Option<&'static str> {
        match self {
            Parameter::SchedulerDbServer => Some("localhost"),
            Parameter::SchedulerDbPort => Some("5432"),
            Parameter::SchedulerDbUser => Some("scheduler"),
            Parameter::SchedulerDbPassword => None,
            Parameter::SchedulerDatabase => Some("atlasmnsdb"),
            Parameter::SchedulerCaFile => Some("None"),
            Parameter::ResultsDbServer => Some("localhost"),
            Parameter::ResultsDbPort => Some("27017"),
            Parameter::ResultsDbUser => Some("importer"),
            Parameter::ResultsDbPassword => None,
            Parameter::ResultsDatabase => Some("atlasmnsdb"),
            Parameter::ResultsCaFile => Some("None"),
            Parameter::AtlasApiKey => None,
        }
    }

    /// 密碼與 API 金鑰
    pub fn is_secret(self) -> bool {
        matches!(
            self,
            Parameter::SchedulerDbPassword | Parameter::ResultsDbPassword | Parameter::AtlasApiKey
        )
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 載入一份設定檔的結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub applied: Vec<Parameter>,
    pub ignored: Vec<String>,
}

/// 平面的參數對應表：名稱 → 值（可為空）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasMnsConfig {
    values: BTreeMap<Parameter, Option<String>>,
}

impl Default for AtlasMnsConfig {
    fn default() -> Self {
        let values = Parameter::ALL
            .into_iter()
            .map(|p| (p, p.default_value().map(str::to_string)))
            .collect();
        Self { values }
    }
}

impl AtlasMnsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, parameter: Parameter) -> Option<&str> {
        self.values.get(&parameter).and_then(|v| v.as_deref())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        Parameter::from_name(name).and_then(|p| self.get(p))
    }

    pub fn set(&mut self, parameter: Parameter, value: Option<String>) {
        self.values.insert(parameter, value);
    }

    /// 依名稱排序的所有參數，機密值以遮罩取代
    pub fn redacted_entries(&self) -> Vec<(Parameter, String)> {
        self.values
            .iter()
            .map(|(p, v)| {
                let shown = match v {
                    None => "<unset>".to_string(),
                    Some(_) if p.is_secret() => "********".to_string(),
                    Some(value) => value.clone(),
                };
                (*p, shown)
            })
            .collect()
    }

    /// 從設定檔載入並覆寫預設值
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
        let content = std::fs::read_to_string(&path)?;
        self.load_str(&content)
    }

    /// 從字串載入；整份內容解析成功後才會套用
    pub fn load_str(&mut self, content: &str) -> Result<LoadReport> {
        let entries = parser::parse_entries(content)?;

        // 隱含區段的鍵在前，接著是它沒有覆寫的 [DEFAULT] 鍵
        let (root, rest): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|e| e.section == parser::ROOT_SECTION);
        let mut effective = root;
        for entry in rest {
            if entry.section == parser::DEFAULT_SECTION {
                if !effective.iter().any(|e| e.key == entry.key) {
                    effective.push(entry);
                }
            } else {
                tracing::debug!(
                    "Parameter {} in section [{}] is ignored",
                    entry.key,
                    entry.section
                );
            }
        }

        let mut report = LoadReport::default();
        let mut updates = Vec::new();
        for entry in effective {
            match Parameter::from_name(&entry.key) {
                Some(parameter) => {
                    updates.push((parameter, parser::substitute_env_vars(&entry.value)));
                    report.applied.push(parameter);
                }
                None => {
                    tracing::warn!("Unknown parameter {} is ignored!", entry.key);
                    report.ignored.push(entry.key);
                }
            }
        }

        for (parameter, value) in updates {
            self.values.insert(parameter, Some(value));
        }
        Ok(report)
    }

    pub fn scheduler_settings(&self) -> Result<DatabaseSettings> {
        self.database_settings(
            Parameter::SchedulerDbServer,
            Parameter::SchedulerDbPort,
            Parameter::SchedulerDbUser,
            Parameter::SchedulerDbPassword,
            Parameter::SchedulerDatabase,
            Parameter::SchedulerCaFile,
        )
    }

    pub fn results_settings(&self) -> Result<DatabaseSettings> {
        self.database_settings(
            Parameter::ResultsDbServer,
            Parameter::ResultsDbPort,
            Parameter::ResultsDbUser,
            Parameter::ResultsDbPassword,
            Parameter::ResultsDatabase,
            Parameter::ResultsCaFile,
        )
    }

    pub fn atlas_api_key(&self) -> Option<&str> {
        self.get(Parameter::AtlasApiKey).filter(|key| !key.trim().is_empty())
    }

    fn database_settings(
        &self,
        server: Parameter,
        port: Parameter,
        user: Parameter,
        password: Parameter,
        database: Parameter,
        ca_file: Parameter,
    ) -> Result<DatabaseSettings> {
        let host = self.required(server)?;
        let port = parse_port(port.name(), validate_required_field(port.name(), self.get(port))?)?;
        let user = self.required(user)?;
        let database = self.required(database)?;

        Ok(DatabaseSettings {
            host,
            port,
            user,
            password: self.get(password).map(str::to_string),
            database,
            ca_mode: CaMode::from_config_value(self.get(ca_file)),
        })
    }

    fn required(&self, parameter: Parameter) -> Result<String> {
        let value = validate_required_field(parameter.name(), self.get(parameter))?;
        validate_non_empty_string(parameter.name(), value)?;
        Ok(value.to_string())
    }
}

impl Validate for AtlasMnsConfig {
    fn validate(&self) -> Result<()> {
        self.scheduler_settings()?;
        self.results_settings()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::AtlasMnsError;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_defaults() {
        let config = AtlasMnsConfig::new();

        assert_eq!(config.get(Parameter::SchedulerDbServer), Some("localhost"));
        assert_eq!(config.get(Parameter::SchedulerDbPort), Some("5432"));
        assert_eq!(config.get(Parameter::SchedulerDbUser), Some("scheduler"));
        assert_eq!(config.get(Parameter::SchedulerDbPassword), None);
        assert_eq!(config.get(Parameter::SchedulerCaFile), Some("None"));
        assert_eq!(config.get(Parameter::ResultsDbPort), Some("27017"));
        assert_eq!(config.get(Parameter::ResultsDbUser), Some("importer"));
        assert_eq!(config.get(Parameter::ResultsDatabase), Some("atlasmnsdb"));
        assert_eq!(config.atlas_api_key(), None);
    }

    #[test]
    fn test_parameter_names_round_trip() {
        for parameter in Parameter::ALL {
            assert_eq!(Parameter::from_name(parameter.name()), Some(parameter));
        }
        assert_eq!(Parameter::from_name("SCHEDULER_DBSERVER"), None);
    }

    #[test]
    fn test_every_recognised_key_overrides_its_default() {
        let mut content = String::new();
        for parameter in Parameter::ALL {
            content.push_str(&format!("{} = value-of-{}\n", parameter, parameter));
        }

        let mut config = AtlasMnsConfig::new();
        let report = config.load_str(&content).unwrap();

        assert_eq!(report.applied.len(), Parameter::ALL.len());
        assert!(report.ignored.is_empty());
        for parameter in Parameter::ALL {
            let expected = format!("value-of-{}", parameter);
            assert_eq!(config.get(parameter), Some(expected.as_str()));
        }
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut config = AtlasMnsConfig::new();
        let report = config
            .load_str("scheduler_dbserver = db.example.net\ncolour = blue\nScheduler_dbport = 1\n")
            .unwrap();

        assert_eq!(report.applied, vec![Parameter::SchedulerDbServer]);
        assert_eq!(report.ignored, vec!["colour".to_string(), "Scheduler_dbport".to_string()]);
        assert_eq!(config.get(Parameter::SchedulerDbServer), Some("db.example.net"));
        assert_eq!(config.get(Parameter::SchedulerDbPort), Some("5432"));
        assert_eq!(config.get_by_name("colour"), None);
    }

    #[test]
    fn test_keys_in_other_sections_are_not_applied() {
        let mut config = AtlasMnsConfig::new();
        let report = config
            .load_str("results_dbuser = reader\n[legacy]\nresults_dbuser = old\n")
            .unwrap();

        assert_eq!(report.applied, vec![Parameter::ResultsDbUser]);
        assert_eq!(config.get(Parameter::ResultsDbUser), Some("reader"));
    }

    #[test]
    fn test_default_section_fills_unset_keys() {
        let mut config = AtlasMnsConfig::new();
        let report = config
            .load_str(
                "results_dbuser = reader\n[DEFAULT]\nresults_dbuser = fallback\nresults_dbport = 27019\n",
            )
            .unwrap();

        assert_eq!(
            report.applied,
            vec![Parameter::ResultsDbUser, Parameter::ResultsDbPort]
        );
        assert_eq!(config.get(Parameter::ResultsDbUser), Some("reader"));
        assert_eq!(config.get(Parameter::ResultsDbPort), Some("27019"));
    }

    #[test]
    fn test_unknown_key_emits_warning() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        let mut config = AtlasMnsConfig::new();
        tracing::subscriber::with_default(subscriber, || {
            config.load_str("colour = blue\nscheduler_dbuser = ops\n").unwrap();
        });

        let output = logs.contents();
        assert!(output.contains("WARN"));
        assert!(output.contains("Unknown parameter colour is ignored!"));
        assert!(!output.contains("scheduler_dbuser is ignored"));
    }

    #[test]
    fn test_failed_parse_leaves_config_untouched() {
        let mut config = AtlasMnsConfig::new();
        let result = config.load_str("scheduler_dbserver = changed\nthis line is broken\n");

        assert!(matches!(result, Err(AtlasMnsError::ConfigParseError { line: 2, .. })));
        assert_eq!(config, AtlasMnsConfig::new());
    }

    #[test]
    fn test_missing_file_leaves_defaults() {
        let mut config = AtlasMnsConfig::new();
        let result = config.load_file("/nonexistent/atlasmns.conf");

        assert!(matches!(result, Err(AtlasMnsError::IoError(_))));
        assert_eq!(config, AtlasMnsConfig::new());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"results_dbserver = mongo.example.net\nresults_cafile = IGNORE\n")
            .unwrap();

        let mut config = AtlasMnsConfig::new();
        config.load_file(temp_file.path()).unwrap();

        let settings = config.results_settings().unwrap();
        assert_eq!(settings.host, "mongo.example.net");
        assert_eq!(settings.port, 27017);
        assert_eq!(settings.ca_mode, CaMode::Ignore);
    }

    #[test]
    fn test_env_var_in_value() {
        std::env::set_var("ATLASMNS_CONFIG_TEST_PASSWORD", "from-env");

        let mut config = AtlasMnsConfig::new();
        config
            .load_str("scheduler_dbpassword = ${ATLASMNS_CONFIG_TEST_PASSWORD}\n")
            .unwrap();
        assert_eq!(config.get(Parameter::SchedulerDbPassword), Some("from-env"));

        std::env::remove_var("ATLASMNS_CONFIG_TEST_PASSWORD");
    }

    #[test]
    fn test_scheduler_settings() {
        let mut config = AtlasMnsConfig::new();
        config
            .load_str(
                "scheduler_dbserver = pg.example.net\nscheduler_dbport = 6432\nscheduler_dbpassword = pw\nscheduler_cafile = /etc/ssl/ca.pem\n",
            )
            .unwrap();

        let settings = config.scheduler_settings().unwrap();
        assert_eq!(settings.host, "pg.example.net");
        assert_eq!(settings.port, 6432);
        assert_eq!(settings.user, "scheduler");
        assert_eq!(settings.password.as_deref(), Some("pw"));
        assert_eq!(settings.database, "atlasmnsdb");
        assert_eq!(settings.ca_mode, CaMode::CustomCaFile(PathBuf::from("/etc/ssl/ca.pem")));
    }

    #[test]
    fn test_invalid_settings() {
        let mut config = AtlasMnsConfig::new();
        config.load_str("results_dbport = mongo\nscheduler_dbserver =\n").unwrap();

        assert!(matches!(
            config.results_settings(),
            Err(AtlasMnsError::InvalidConfigValueError { ref field, .. }) if field == "results_dbport"
        ));
        assert!(config.scheduler_settings().is_err());
        assert!(config.validate().is_err());
        assert!(AtlasMnsConfig::new().validate().is_ok());
    }

    #[test]
    fn test_redacted_entries_hide_secrets() {
        let mut config = AtlasMnsConfig::new();
        config.set(Parameter::AtlasApiKey, Some("secret-key".to_string()));

        let entries = config.redacted_entries();
        assert_eq!(entries.len(), Parameter::ALL.len());
        assert!(entries.iter().all(|(_, v)| v != "secret-key"));
        assert!(entries
            .iter()
            .any(|(p, v)| *p == Parameter::SchedulerDbPassword && v == "<unset>"));
    }
}
