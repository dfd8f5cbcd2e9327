//! Compare command implementation

use std::path::PathBuf;

use clap::Args;
use rust_decimal::Decimal;

use super::{read_json, OutputFormat};
use crate::api::{CalculatorService, CompareRequest, CompareResponse};

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// JSON file with `baseParams`, `scenarios` and optional `winRate`
    #[arg(long)]
    pub input: PathBuf,

    /// Win rate in percent; overrides the file and the configured default
    #[arg(long)]
    pub win_rate: Option<Decimal>,

    /// Evaluate scenarios on parallel blocking tasks
    #[arg(long)]
    pub parallel: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl CompareArgs {
    pub async fn execute(&self, service: &CalculatorService) -> anyhow::Result<()> {
        let mut request: CompareRequest = read_json(&self.input).await?;
        if self.win_rate.is_some() {
            request.win_rate = self.win_rate;
        }
        tracing::debug!(
            scenarios = request.scenarios.len(),
            input = %self.input.display(),
            "Loaded comparison request"
        );

        let response = service.compare(&request, self.parallel).await?;
        println!("{}", render(&response, self.format)?);
        Ok(())
    }
}

fn render(response: &CompareResponse, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(response)?,
        OutputFormat::Table => response.format_table(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskEngine;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const REQUEST: &str = r#"{
        "baseParams": {"direction": "long", "entryPrice": 100, "accountSize": 1000, "riskPercent": 1},
        "scenarios": [
            {"name": "wide", "stopLoss": 95, "targetPrice": 110},
            {"name": "tight", "stopLoss": 98, "targetPrice": 110}
        ],
        "winRate": 60
    }"#;

    fn request_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(REQUEST.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_execute_runs_comparison() {
        let file = request_file();
        let args = CompareArgs {
            input: file.path().to_path_buf(),
            win_rate: Some(dec!(40)),
            parallel: true,
            format: OutputFormat::Json,
        };
        let service = CalculatorService::new(RiskEngine::default());
        assert!(args.execute(&service).await.is_ok());
    }

    #[tokio::test]
    async fn test_render_table() {
        let file = request_file();
        let request: CompareRequest = read_json(file.path()).await.unwrap();
        let service = CalculatorService::new(RiskEngine::default());
        let response = service.compare(&request, false).await.unwrap();

        let table = render(&response, OutputFormat::Table).unwrap();
        assert!(table.contains("wide"));
        assert!(table.contains("tight"));
        assert!(table.contains("Win rate: 60%"));
        assert!(table.contains("Best R:R: 1"));
    }

    #[tokio::test]
    async fn test_execute_rejects_missing_file() {
        let args = CompareArgs {
            input: PathBuf::from("/nonexistent/scenarios.json"),
            win_rate: None,
            parallel: false,
            format: OutputFormat::Table,
        };
        let service = CalculatorService::new(RiskEngine::default());
        assert!(args.execute(&service).await.is_err());
    }
}
