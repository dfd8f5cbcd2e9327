//! End-to-end tests through the calculator service

use rust_decimal_macros::dec;
use serde_json::{json, Value};
use trade_risk::api::{CalculatorService, CompareRequest, ServiceError};
use trade_risk::config::Config;
use trade_risk::risk::{RiskEngine, RiskError, TradeInput, Violation};

fn service() -> CalculatorService {
    CalculatorService::new(RiskEngine::default())
}

fn input(value: Value) -> TradeInput {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_long_trade_report() {
    let response = service()
        .calculate(
            &input(json!({
                "direction": "LONG",
                "entryPrice": 45000,
                "stopLoss": 43000,
                "targetPrice": 49000,
                "accountSize": 1000,
                "riskPercent": 2
            })),
            false,
        )
        .await
        .unwrap();

    let report = response.report;
    assert_eq!(report.risk_amount, dec!(20));
    assert_eq!(report.stop_distance, dec!(2000));
    assert_eq!(report.position_size, dec!(0.01));
    assert_eq!(report.reward_amount, dec!(40));
    assert_eq!(report.risk_reward_ratio, dec!(2));
    assert_eq!(report.fee_estimate, dec!(0.45));
}

#[tokio::test]
async fn test_short_trade_mirrors_long() {
    let response = service()
        .calculate(
            &input(json!({
                "direction": "short",
                "entryPrice": "45000",
                "stopLoss": "47000",
                "targetPrice": "41000",
                "accountSize": "1000",
                "riskPercent": "2"
            })),
            false,
        )
        .await
        .unwrap();

    let report = response.report;
    assert_eq!(report.risk_amount, dec!(20));
    assert_eq!(report.position_size, dec!(0.01));
    assert_eq!(report.reward_amount, dec!(40));
    assert_eq!(report.risk_reward_ratio, dec!(2));
}

#[tokio::test]
async fn test_zero_stop_distance_is_safe() {
    let response = service()
        .calculate(
            &input(json!({
                "direction": "LONG",
                "entryPrice": 100,
                "stopLoss": 100,
                "targetPrice": 110,
                "accountSize": 1000,
                "riskPercent": 1
            })),
            false,
        )
        .await
        .unwrap();

    assert_eq!(response.report.position_size, dec!(0));
    assert_eq!(response.report.reward_amount, dec!(0));
    assert_eq!(response.report.risk_reward_ratio, dec!(0));
}

#[tokio::test]
async fn test_stop_above_entry_for_long_fails() {
    let err = service()
        .calculate(
            &input(json!({
                "direction": "LONG",
                "entryPrice": 100,
                "stopLoss": 110,
                "targetPrice": 120,
                "accountSize": 1000,
                "riskPercent": 1
            })),
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Risk(RiskError::InvalidParameters(Violation::StopOnWrongSide { .. }))
    ));
}

#[tokio::test]
async fn test_missing_and_unparseable_fields() {
    let err = service()
        .calculate(&input(json!({"entryPrice": 100})), false)
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::Risk(RiskError::missing("direction")));

    let err = service()
        .calculate(
            &input(json!({
                "direction": "long",
                "entryPrice": "abc",
                "accountSize": 1000,
                "riskPercent": 1
            })),
            false,
        )
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::Risk(RiskError::missing("entryPrice")));
}

#[tokio::test]
async fn test_compare_scenarios_independent() {
    let request: CompareRequest = serde_json::from_value(json!({
        "baseParams": {
            "entryPrice": 100,
            "stopLoss": 95,
            "targetPrice": 120,
            "accountSize": 1000
        },
        "scenarios": [
            {"riskPercent": 1},
            {"riskPercent": 2},
            {"riskPercent": -5}
        ]
    }))
    .unwrap();

    let response = service().compare(&request, false).await.unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["scenarios"][0]["status"], "ok");
    assert_eq!(json["scenarios"][0]["report"]["riskAmount"], 10.0);
    assert_eq!(json["scenarios"][1]["report"]["riskAmount"], 20.0);
    assert_eq!(json["scenarios"][2]["status"], "error");
    assert_eq!(json["scenarios"][2]["error"]["kind"], "INVALID_PARAMETERS");
    assert_eq!(json["comparison"]["lowestRisk"], 0);
    assert_eq!(json["comparison"]["highestReward"], 1);
    assert!(json.get("requestId").is_some());
}

#[tokio::test]
async fn test_response_wire_format() {
    let response = service()
        .calculate(
            &input(json!({
                "symbol": "BTC/USDT",
                "direction": "long",
                "entryPrice": 100,
                "stopLoss": 97,
                "targetPrice": 120,
                "accountSize": 1000,
                "riskPercent": 1,
                "currentPrice": 103
            })),
            false,
        )
        .await
        .unwrap();

    let json = serde_json::to_value(&response).unwrap();
    let report = &json["report"];
    // 10 / 3 rounded to 8 places
    let size = report["positionSize"].as_f64().unwrap();
    assert!((size - 3.33333333).abs() < 1e-12);
    assert_eq!(report["currentPnL"], 10.0);
    assert_eq!(report["takeProfitLadder"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["symbol"], "BTC/USDT");
    assert!(json.get("tradeId").is_none());
}

#[test]
fn test_config_example_loads() {
    let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example")).unwrap();
    assert_eq!(config.engine.fee_rate, dec!(0.001));
    assert_eq!(config.engine.max_risk_percent, dec!(100));
    assert_eq!(config.engine.default_win_rate, dec!(50));
    assert_eq!(config.telemetry.log_level, "info");
}
