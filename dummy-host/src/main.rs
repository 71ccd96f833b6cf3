use anyhow::Result;
use clap::Parser;
use dummy_host::config::{log_filter, HostConfig};

fn main() -> Result<()> {
    // JSON logs with DUMMY_LOG_JSON=1, human-readable otherwise. Logs go to
    // stderr so the report on stdout stays machine-readable.
    let json_logs = std::env::var("DUMMY_LOG_JSON").unwrap_or_default() == "1";
    let filter = log_filter(std::env::var("RUST_LOG").ok().as_deref());
    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = HostConfig::parse();
    tracing::info!(
        "Running {} iterations per strategy ({:?})",
        config.iterations,
        config.strategies()
    );

    let report = dummy_host::bench::run(&config)?;
    println!("{}", report.render(config.format)?);
    Ok(())
}
