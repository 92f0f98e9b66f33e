//! Readiness monitor - waits for a learning server's models to become ready.
//!
//! Exits 0 once `/models/status` reports every model ready, 1 on timeout or
//! bad arguments. With `--yt` it then fetches that video's transcript from the
//! server and saves it under `--out-dir`; a failed fetch also exits 1.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use learning_server::logging;
use learning_server::monitor::{MonitorConfig, ReadinessMonitor, TranscriptJob};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "Usage: readiness-monitor [--status-url URL] [--timeout SECS] \
    [--poll-interval SECS] [--max-interval SECS] [--log-path PATH] \
    [--yt VIDEO [--fetch-url URL] [--out-dir DIR]]";

/// Parsed command line.
#[derive(Debug)]
struct Cli {
    config: MonitorConfig,
    transcript: Option<TranscriptJob>,
}

fn parse_secs(flag: &str, value: Option<String>) -> Result<Duration, String> {
    let value = value.ok_or_else(|| format!("{} requires a value", flag))?;
    value
        .parse::<f64>()
        .ok()
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| format!("{}: invalid duration {:?}", flag, value))
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Cli, String> {
    let mut config = MonitorConfig::default();
    let mut video = None;
    let mut fetch_url = None;
    let mut out_dir = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--status-url" => {
                config.status_url = args.next().ok_or("--status-url requires a value")?;
            }
            "--timeout" => config.timeout = parse_secs(&arg, args.next())?,
            "--poll-interval" => config.poll_interval = parse_secs(&arg, args.next())?,
            "--max-interval" => config.max_interval = parse_secs(&arg, args.next())?,
            "--log-path" => {
                config.log_path =
                    Some(PathBuf::from(args.next().ok_or("--log-path requires a value")?));
            }
            "--yt" => video = Some(args.next().ok_or("--yt requires a value")?),
            "--fetch-url" => fetch_url = Some(args.next().ok_or("--fetch-url requires a value")?),
            "--out-dir" => {
                out_dir = Some(PathBuf::from(args.next().ok_or("--out-dir requires a value")?));
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    let transcript = match video {
        Some(video) => {
            let mut job = TranscriptJob::new(video);
            if let Some(url) = fetch_url {
                job.fetch_url = url;
            }
            if let Some(dir) = out_dir {
                job.out_dir = dir;
            }
            Some(job)
        }
        None if fetch_url.is_some() || out_dir.is_some() => {
            return Err("--fetch-url and --out-dir require --yt".to_string());
        }
        None => None,
    };

    Ok(Cli { config, transcript })
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("readiness-monitor {}", VERSION);
        return ExitCode::SUCCESS;
    }
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    logging::init_tracing("info");

    let Cli { config, transcript } = match parse_args(args.into_iter()) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        "Waiting up to {:?} for models at {}",
        config.timeout,
        config.status_url
    );

    let monitor = ReadinessMonitor::new(config);
    match monitor.wait_until_ready().await {
        Ok(status) => {
            tracing::info!(
                summarizer = %status.summarizer_model,
                generator = %status.generator_model,
                "Models are ready"
            );
        }
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    let Some(job) = transcript else {
        return ExitCode::SUCCESS;
    };
    match monitor.fetch_and_save(&job).await {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Transcript fetch failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
