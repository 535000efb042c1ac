use atlasmns::utils::logger;
use atlasmns::{AtlasMns, AtlasMnsConfig, AtlasMnsError, CheckArgs};
use clap::Parser;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

fn report_failure(e: &AtlasMnsError) {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CheckArgs::parse();

    // 初始化日誌
    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    logger::init_logger(level, args.json_logs);

    tracing::info!("Starting atlasmns check");

    let mut config = AtlasMnsConfig::default();
    if let Some(path) = args.config_path() {
        tracing::info!("📁 Loading configuration from: {}", path);
        if let Err(e) = config.load_file(path) {
            report_failure(&e);
            std::process::exit(e.exit_code());
        }
    }

    if args.show_config {
        for (parameter, value) in config.redacted_entries() {
            println!("{} = {}", parameter, value);
        }
    }

    let (atlas, scheduler, results) = args.targets();
    let mut mns = AtlasMns::with_configuration(config)
        .with_connect_timeout(Duration::from_secs(args.timeout))
        .with_atlas_base_url(args.atlas_url.clone());

    let mut worst: Option<AtlasMnsError> = None;
    let mut record = |outcome: atlasmns::Result<()>, name: &str| match outcome {
        Ok(()) => println!("✅ {}: ok", name),
        Err(e) => {
            println!("❌ {}: {}", name, e);
            report_failure(&e);
            if worst
                .as_ref()
                .map(|w| e.severity() > w.severity())
                .unwrap_or(true)
            {
                worst = Some(e);
            }
        }
    };

    if atlas {
        record(mns.try_connect_to_ripe_atlas().await.map(|_| ()), "RIPE Atlas");
    }
    if scheduler {
        record(mns.try_connect_to_scheduler_db().await, "scheduler database");
    }
    if results {
        record(mns.try_connect_to_results_db().await, "results database");
    }

    if let Err(e) = mns.close().await {
        tracing::warn!("Error while closing connections: {}", e);
    }

    if let Some(e) = worst {
        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
