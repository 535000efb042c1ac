use atlasmns::utils::logger;
use atlasmns::{AgentArgs, AtlasMns, AtlasMnsError, Parameter};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match AgentArgs::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            eprintln!("ERROR: Bad parameter: {}", e);
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    // 初始化日誌；設定檔中未知參數的警告需要它
    logger::init_logger(logger::level_from_severity(args.loglevel), args.json_logs);

    let config = match args.resolve_configuration() {
        Ok(config) => config,
        Err(AtlasMnsError::IoError(e)) => {
            eprintln!(
                "ERROR: Unable to open configuration file {}: {}",
                args.config_path().unwrap_or("<none>"),
                e
            );
            std::process::exit(1);
        }
        Err(e) => {
            match args.config_path() {
                Some(path) => eprintln!("ERROR: Bad parameter in configuration file {}: {}", path, e),
                None => eprintln!("ERROR: Bad parameter: {}", e),
            }
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Trace agent using scheduler database {} at {}:{}",
        config.get(Parameter::SchedulerDatabase).unwrap_or("<unset>"),
        config.get(Parameter::SchedulerDbServer).unwrap_or("<unset>"),
        config.get(Parameter::SchedulerDbPort).unwrap_or("<unset>")
    );

    if args.check {
        let mut mns = AtlasMns::with_configuration(config);
        if !mns.connect_to_scheduler_db().await {
            std::process::exit(1);
        }
        tracing::info!("Scheduler database connection established");
        mns.close().await?;
    }

    Ok(())
}
