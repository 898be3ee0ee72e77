use clap::Parser;
use weather_monitor::cli::{run, Cli};
use weather_monitor::utils::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_settings())?;
    run(cli).await?;
    Ok(())
}
