use anyhow::Context;
use clap::Parser;
use station_enrich::config::cli::{AnalyzeArgs, Cli, Command, LookupArgs, RunArgs};
use station_enrich::core::ownership::{analyze_ownership, read_tax_history};
use station_enrich::domain::ports::PropertyLookup;
use station_enrich::utils::error::{EnrichError, ErrorSeverity};
use station_enrich::utils::logger::{self, LogFormat};
use station_enrich::utils::validation::Validate;
use station_enrich::{EnrichmentEngine, EnrichmentPipeline, LocalStorage, OprsClient, RunSummary};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(cli.verbose, format);

    tracing::info!("Starting station-enrich CLI");
    if cli.verbose {
        tracing::debug!("CLI command: {:?}", cli.command);
    }

    match cli.command {
        Command::Run(args) => match run(args).await {
            Ok(summary) => {
                tracing::info!("✅ Enrichment completed successfully!");
                println!(
                    "✅ Enriched {} records ({} lookups failed)",
                    summary.records, summary.failed_lookups
                );
                println!("📁 Output saved to: {}", summary.output_path);
            }
            Err(e) => exit_with(&e),
        },
        Command::Lookup(args) => lookup(args).await?,
        Command::Analyze(args) => analyze(args)?,
    }

    Ok(())
}

async fn run(args: RunArgs) -> station_enrich::Result<RunSummary> {
    // 驗證配置
    args.validate()?;
    let settings = args.source.resolve()?;
    tracing::debug!("Source settings: {:?}", settings);

    let monitor_enabled = args.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let lookup = OprsClient::new(settings)?;
    let pipeline = EnrichmentPipeline::new(LocalStorage::default(), lookup, args);
    let engine = EnrichmentEngine::new_with_monitoring(pipeline, monitor_enabled);

    engine.run().await
}

fn exit_with(e: &EnrichError) -> ! {
    tracing::error!(
        "❌ Enrichment failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

async fn lookup(args: LookupArgs) -> anyhow::Result<()> {
    args.validate()?;
    let settings = args.source.resolve()?;
    let client = OprsClient::new(settings)?;

    let query = args.query();
    tracing::info!("Looking up {}", query.search_address());
    let attributes = client
        .lookup(&query)
        .await
        .with_context(|| format!("lookup failed for {}", query.search_address()))?;

    println!("{}", serde_json::to_string_pretty(&attributes)?);
    Ok(())
}

fn analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    args.validate()?;
    let data = std::fs::read(&args.tax_history_path)
        .with_context(|| format!("could not read {}", args.tax_history_path))?;
    let history = read_tax_history(&data)?;

    let Some(summary) = analyze_ownership(&history)? else {
        anyhow::bail!("{} has no tax history rows", args.tax_history_path);
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("\nOwnership Analysis:");
        println!("Current Owner: {}", summary.owner);
        println!("Mailing Address: {}", summary.mailing_address);
        println!("Ownership Start Year: {}", summary.ownership_start_year);
        println!("Current Year: {}", summary.current_year);
        println!("Years Owned: {}", summary.years_owned);
    }
    Ok(())
}
