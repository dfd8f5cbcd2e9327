use clap::Parser;
use trade_risk::api::CalculatorService;
use trade_risk::cli::{Cli, Commands};
use trade_risk::config::Config;
use trade_risk::risk::RiskEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let (config, load_error) = match Config::load(&cli.config) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // Initialize telemetry
    trade_risk::telemetry::init_telemetry(&config.telemetry)?;
    if let Some(e) = load_error {
        tracing::warn!(path = %cli.config, error = %e, "Could not load config, using defaults");
    }

    let engine = RiskEngine::from_config(&config.engine)?;
    let service = CalculatorService::new(engine);

    match cli.command {
        Commands::Calc(args) => {
            tracing::debug!("Running calculation");
            args.execute(&service).await?;
        }
        Commands::Compare(args) => {
            tracing::debug!("Running scenario comparison");
            args.execute(&service).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
