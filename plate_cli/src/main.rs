mod cli;
mod error_fmt;
mod rt;
mod run;

use clap::Parser;
use eyre::WrapErr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use run::RunOpts;

fn main() {
    let args = Cli::parse();
    let _ = JSON_MODE.set(args.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("Warning: error-report hooks not installed: {e}");
    }

    match real_main(args) {
        Ok(()) => {}
        Err(err) => {
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", error_fmt::format_error_json(&err));
            } else {
                eprintln!("{}", error_fmt::humanize(&err));
            }
            std::process::exit(error_fmt::exit_code_for_error(&err));
        }
    }
}

fn real_main(args: Cli) -> eyre::Result<()> {
    let cfg = load_config(&args)?;
    init_tracing(args.json, &args.log_level, &cfg.logging)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
        })
        .wrap_err("failed to install Ctrl-C handler")?;
    }

    match args.cmd {
        Commands::Run {
            duration_secs,
            batches,
            paced,
            rt,
            rt_prio,
            rt_lock,
            rt_cpu,
        } => {
            let opts = RunOpts {
                duration_secs,
                batches,
                paced,
                json: args.json,
                rt,
                rt_prio,
                rt_lock,
                rt_cpu,
            };
            let report = run::run_stream(&cfg, &opts, shutdown)?;
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "event": "complete",
                        "batches_applied": report.batches_applied,
                        "batches_dropped": report.batches_dropped,
                    })
                );
            } else {
                println!(
                    "stream complete: {} batches applied, {} dropped",
                    report.batches_applied, report.batches_dropped
                );
            }
            Ok(())
        }
        Commands::SelfCheck => run::self_check(&cfg),
    }
}

/// Load and validate the TOML config, then fold in the optional channel map.
///
/// A missing file at the default path falls back to built-in defaults; an
/// explicitly given path must exist.
fn load_config(args: &Cli) -> eyre::Result<plate_config::Config> {
    use plate_core::PlateError;

    let default_path = args.config == std::path::Path::new("etc/plate_config.toml");
    let mut cfg = if args.config.exists() {
        let text = std::fs::read_to_string(&args.config).map_err(|e| {
            PlateError::Config(format!("failed to read {}: {e}", args.config.display()))
        })?;
        plate_config::load_toml(&text).map_err(|e| {
            PlateError::Config(format!("failed to parse {}: {e}", args.config.display()))
        })?
    } else if default_path {
        plate_config::Config::default()
    } else {
        return Err(
            PlateError::Config(format!("config file not found: {}", args.config.display())).into(),
        );
    };

    if let Some(map_path) = &args.channel_map {
        let rows = plate_config::load_channel_map_csv(map_path)
            .map_err(|e| PlateError::Config(e.to_string()))?;
        cfg.apply_channel_map(&rows);
    }
    cfg.validate()
        .map_err(|e| PlateError::Config(e.to_string()))?;
    Ok(cfg)
}

fn init_tracing(json: bool, cli_level: &str, logging: &plate_config::Logging) -> eyre::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = logging.level.as_deref().unwrap_or(cli_level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;
    let registry = tracing_subscriber::registry().with(filter);

    // Telemetry goes to stdout; logs stay on stderr.
    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    if let Some(path) = &logging.file {
        let path = std::path::Path::new(path);
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file has no file name: {}", path.display()))?;
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        if json {
            let file_layer = fmt::layer().json().with_writer(writer);
            registry.with(console.json()).with(file_layer).init();
        } else {
            let file_layer = fmt::layer().json().with_writer(writer);
            registry.with(console).with(file_layer).init();
        }
    } else if json {
        registry.with(console.json()).init();
    } else {
        registry.with(console).init();
    }
    Ok(())
}
