use anyhow::Result;
use clap::Parser;

use qnxt::cli::{self, CliArgs};
use qnxt::config::{Config, LogFormat};

fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = Config::from_args(&args.connection)?;
    config.validate()?;

    init_logging(&config);
    tracing::debug!("Configuration: {:?}", config);

    cli::run(&config, &args)
}

/// Install the tracing subscriber; RUST_LOG wins over the configured level
fn init_logging(config: &Config) {
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
