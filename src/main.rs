//! instalooter-rs - CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use instalooter::{
    api::ApiClient,
    cli::{Args, Command},
    config::{parse_post_shortcode, parse_time_window, validate_config, Config},
    error::{exit_codes, Error, Result},
    looter::{DownloadRequest, Looter},
    output::{print_error, print_info, print_success, print_warning, BarProgress},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::InvalidTarget(_)
                | Error::TomlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::SourceUnavailable(_) | Error::AccountNotFound(_) | Error::Http(_) => {
                    ExitCode::from(exit_codes::SOURCE_ERROR as u8)
                }
                Error::DownloadFailed(_) => ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt().with_env_filter(filter).with_target(false).init();

    // Load configuration
    let mut config = match &args.config {
        Some(path) if path.exists() => Config::load(path)?,
        Some(path) => {
            return Err(Error::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        None => Config::default(),
    };

    // Merge CLI arguments into config and validate
    args.command.common_opts().merge_into_config(&mut config);
    validate_config(&config)?;

    // Initialize API client
    let api = Arc::new(ApiClient::new(
        &config.network.user_agent,
        config.timeout(),
        config.retry_policy(),
    )?);

    // Build the looter for the requested target
    let options = config.looter_options();
    let mut looter = match &args.command {
        Command::User { username, .. } => Looter::profile(api, username, options)?,
        Command::Hashtag { tag, .. } => Looter::tag(api, tag.trim_start_matches('#'), options)?,
        Command::Post { post, .. } => {
            let shortcode = parse_post_shortcode(post)?;
            Looter::post(api, &shortcode, options)?
        }
    };

    // Assemble the download request
    let opts = args.command.common_opts();
    let mut request = DownloadRequest {
        max_count: opts.num_to_dl,
        stop_on_existing: opts.new,
        ..Default::default()
    };
    if let Some(raw) = &opts.time {
        request.time_window = Some(parse_time_window(raw)?);
    }
    if !args.quiet {
        request.page_progress = Some(Arc::new(BarProgress::spinner("Fetching pages")));
        request.download_progress = Some(Arc::new(BarProgress::items("Downloading")));
    }

    let dest = args.command.dest().clone();
    print_info(&format!("Downloading into {}", dest.display()));

    let queued = looter.download(&dest, request).await?;

    if queued == 0 {
        print_warning("No medias found.");
    } else {
        print_success(&format!("Queued {} post(s) for download", queued));
    }

    Ok(())
}
