use auto_apply::adapters::attachments::AttachmentSet;
use auto_apply::adapters::email::SmtpMailer;
use auto_apply::adapters::form::HttpFormSubmitter;
use auto_apply::adapters::log_csv::CsvAttemptLog;
use auto_apply::adapters::roster;
use auto_apply::config::AppConfig;
use auto_apply::core::engine::{EngineOptions, OutreachEngine, RunReport};
use auto_apply::core::idempotency::IdempotencyGuard;
use auto_apply::core::template::ContentRenderer;
use auto_apply::domain::model::{Channel, Mode};
use auto_apply::domain::ports::ChannelAdapter;
use auto_apply::utils::error::ErrorSeverity;
use auto_apply::utils::logger;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "auto-apply")]
#[command(about = "Auto-apply to internship offers (emails + forms)")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Path to the companies roster CSV
    #[arg(long, default_value = "companies.csv")]
    companies: PathBuf,

    /// Channels to exercise
    #[arg(long, value_enum, default_value = "both")]
    mode: Mode,

    /// Validate, render and log without sending or submitting anything
    #[arg(long)]
    dry_run: bool,

    /// Process at most N companies
    #[arg(long)]
    limit: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);
    tracing::info!("🚀 Starting auto-apply");

    match run(&args).await {
        Ok((report, log_path)) => {
            let suffix = if report.cancelled {
                " (cancelled early)"
            } else {
                ""
            };
            tracing::info!("✅ Outreach run completed{}", suffix);
            println!("✅ Outreach run completed{}", suffix);
            println!(
                "📊 {} companies, {} records: {} succeeded, {} failed, {} skipped, {} dry-run",
                report.companies,
                report.records(),
                report.succeeded,
                report.failed,
                report.skipped,
                report.dry_run
            );
            println!("📁 Log: {}", log_path.display());
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(args: &Args) -> auto_apply::Result<(RunReport, PathBuf)> {
    let config = AppConfig::from_file(&args.config)?;
    config.validate_for(args.mode)?;
    tracing::info!("✅ Configuration loaded and validated");

    let mut companies = roster::read_companies(&args.companies)?;
    if let Some(limit) = args.limit {
        companies.truncate(limit);
    }

    let log_path = config.log_path();
    let (log, history) = CsvAttemptLog::open(&log_path)?;
    let guard = IdempotencyGuard::from_history(&history);
    tracing::info!(
        "🗒️ Audit log at {} ({} prior records)",
        log_path.display(),
        history.len()
    );

    let attachments = Arc::new(AttachmentSet::load(&config.files)?);
    tracing::debug!("Loaded {} attachment(s)", attachments.len());

    let mut adapters: Vec<Box<dyn ChannelAdapter>> = Vec::new();
    if args.mode.wants(Channel::Email) {
        adapters.push(Box::new(SmtpMailer::new(
            config.smtp()?,
            &config.identity,
            Arc::clone(&attachments),
        )?));
    }
    if args.mode.wants(Channel::Form) {
        adapters.push(Box::new(HttpFormSubmitter::new(
            &config,
            Arc::clone(&attachments),
        )?));
    }

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be sent or submitted");
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("🛑 Ctrl-C received, finishing the current company before stopping");
                shutdown.store(true, Ordering::Relaxed);
            }
        });
    }

    let options = EngineOptions {
        mode: args.mode,
        dry_run: args.dry_run,
        retry: config.retry_policy(),
        on_inapplicable: config.on_inapplicable(),
    };
    let renderer = ContentRenderer::from_config(&config);

    let mut engine = OutreachEngine::new(adapters, renderer, guard, log, options)
        .with_shutdown(shutdown);
    let report = engine.run(&companies).await?;

    Ok((report, log_path))
}
