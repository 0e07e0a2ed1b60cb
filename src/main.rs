//! Reddit Forwarder - CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use reddit_forwarder::{
    cli::{Args, ModeArg},
    config::{validate_config, Config},
    error::{exit_codes, Error, Result},
    fetch::HttpFetcher,
    fs::Storage,
    ledger::Ledger,
    output::{print_banner, print_error, print_info, print_ledger_summary, print_success, print_warning},
    pipeline::{Handlers, Pipeline, TokioSleeper},
    reddit::RedditClient,
    redgifs::RedgifsClient,
    remux::FfmpegRemuxer,
    telegram::TelegramBot,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_) | Error::ConfigValidation { .. } | Error::MissingConfig(_) => {
                    ExitCode::from(exit_codes::CONFIG_ERROR as u8)
                }
                Error::Authentication(_) | Error::Api(_) => {
                    ExitCode::from(exit_codes::API_ERROR as u8)
                }
                Error::Io(_) | Error::Json(_) => ExitCode::from(exit_codes::LEDGER_ERROR as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    // Print banner
    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mode = args.mode;
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            config_path.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Maintenance mode needs no credentials: wipe the excluded list so
    // posts that failed transiently get another chance.
    if mode == ModeArg::ResetLedger {
        let mut ledger = Ledger::open(&config.ledger_path())?;
        let discarded = ledger.reset_excluded()?;
        print_success(&format!(
            "Discarded {} excluded entries, kept {} downloads",
            discarded,
            ledger.downloaded_count()
        ));
        print_ledger_summary(&ledger);
        return Ok(());
    }

    // Validate configuration
    validate_config(&config)?;

    // Storage and ledger
    let storage = Storage::create(&config.options.storage_path)?;
    let ledger = Ledger::open(&config.ledger_path())?;
    print_ledger_summary(&ledger);

    // Validate Telegram token
    print_info("Connecting to Telegram...");
    let bot = TelegramBot::new(config.telegram.bot_token.clone())?;
    let bot_info = bot.get_me().await?;
    print_info(&format!(
        "Bot: @{}",
        bot_info.username.as_deref().unwrap_or("unknown")
    ));

    // Validate Reddit credentials
    print_info("Connecting to Reddit...");
    let reddit = RedditClient::new(config.reddit.clone())?;
    reddit.validate_credentials().await?;
    print_info(&format!("Authenticated as u/{}", config.reddit.username));

    // Assemble the pipeline
    let fetcher = HttpFetcher::new(&config.reddit.user_agent)?;
    let handlers = Handlers::new(
        Arc::new(fetcher),
        Arc::new(bot),
        Arc::new(FfmpegRemuxer),
        Arc::new(RedgifsClient::new()?),
        storage,
        config.telegram.chat_id.clone(),
        config.options.max_file_size,
        config.options.save_files,
    );

    let mut pipeline = Pipeline::new(
        Arc::new(reddit),
        handlers,
        ledger,
        config.options.video_hosts.clone(),
        Duration::from_secs(config.options.poll_interval_seconds),
        Arc::new(TokioSleeper),
    );

    // Ctrl-C cancels at the next loop boundary; an in-flight post finishes.
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl-C received, stopping after the current post");
                shutdown.cancel();
            }
        });
    }

    print_info(&format!(
        "Polling upvoted posts every {}s; press Ctrl-C to stop",
        config.options.poll_interval_seconds
    ));
    pipeline.run(shutdown).await;

    print_ledger_summary(pipeline.ledger());

    Ok(())
}
