use clap::Parser;
use invoice_packet_dispatcher::cli::Args;
use invoice_packet_dispatcher::{
    load_contacts, AppConfig, Credentials, DeliveryMode, Dispatcher, RunReport, SmtpMailer,
};
use tracing::{info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    let args = Args::parse();

    // 加载配置, 命令行参数优先; 之后不再修改
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(dry_run) = args.dry_run_override() {
        config.dry_run = dry_run;
    }
    let config = config;
    info!("Starting dispatcher with config: {:?}", config);

    let contacts = load_contacts(&config.paths.contacts_file)?;
    if contacts.is_empty() {
        warn!(
            "No contacts with an email address in {}; every packet will be logged as no contact",
            config.paths.contacts_file.display()
        );
    }

    let report = if config.dry_run {
        Dispatcher::<SmtpMailer>::new(&config, &contacts, DeliveryMode::DryRun)
            .run()
            .await?
    } else {
        // 凭据只在实发时需要
        let credentials = Credentials::load(&config.paths.env_file)?;
        let mailer = SmtpMailer::new(&config.mail, &credentials)?;
        Dispatcher::new(&config, &contacts, DeliveryMode::Live(mailer))
            .run()
            .await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    for entry in &report.entries {
        println!("{}  {}  {}", entry.client_name, entry.filename, entry.status);
    }
    println!(
        "Processed {} invoice file(s): {} sent, {} dry run, {} without contact, {} failed, {} missing summary",
        report.discovered,
        report.sent,
        report.dry_run,
        report.no_contact,
        report.failed,
        report.skipped_missing_summary
    );
}
