//! Calc command implementation

use std::path::PathBuf;

use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use super::{read_json, OutputFormat};
use crate::api::{CalculationResponse, CalculatorService};
use crate::risk::TradeInput;

#[derive(Args, Debug)]
pub struct CalcArgs {
    /// JSON file with the trade record; flags override its fields
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Trade direction: long or short
    #[arg(long)]
    pub direction: Option<String>,

    /// Entry price
    #[arg(long)]
    pub entry: Option<Decimal>,

    /// Stop-loss price
    #[arg(long)]
    pub stop: Option<Decimal>,

    /// Target price
    #[arg(long)]
    pub target: Option<Decimal>,

    /// Account size
    #[arg(long)]
    pub account: Option<Decimal>,

    /// Percent of the account to risk
    #[arg(long)]
    pub risk: Option<Decimal>,

    /// Current market price
    #[arg(long)]
    pub current: Option<Decimal>,

    /// Instrument symbol
    #[arg(long)]
    pub symbol: Option<String>,

    /// Exchange name
    #[arg(long)]
    pub exchange: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl CalcArgs {
    pub async fn execute(&self, service: &CalculatorService) -> anyhow::Result<()> {
        let base = match &self.input {
            Some(path) => read_json::<TradeInput>(path).await?,
            None => TradeInput::default(),
        };
        let input = base.merged_with(&self.flag_overrides());

        let response = service.calculate(&input, false).await?;
        println!("{}", render(&response, self.format)?);
        Ok(())
    }

    /// Record built from the command-line flags alone
    fn flag_overrides(&self) -> TradeInput {
        let number = |value: Option<Decimal>| value.map(|d| Value::String(d.to_string()));
        TradeInput {
            exchange: self.exchange.clone(),
            symbol: self.symbol.clone(),
            direction: self.direction.clone().map(Value::String),
            entry_price: number(self.entry),
            stop_loss: number(self.stop),
            target_price: number(self.target),
            account_size: number(self.account),
            risk_percent: number(self.risk),
            current_price: number(self.current),
        }
    }
}

fn render(response: &CalculationResponse, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(response)?,
        OutputFormat::Table => {
            let mut out = String::new();
            if let Some(symbol) = &response.symbol {
                let exchange = response.exchange.as_deref().unwrap_or("-");
                out.push_str(&format!("\n{} on {}", symbol, exchange));
            }
            out.push_str(&response.report.format_table());
            out
        }
    })
}
