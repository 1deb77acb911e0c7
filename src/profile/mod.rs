//! Profile resolver
//!
//! Normalizes a raw customer record (whatever shape the store returns)
//! into a canonical `AdvisoryProfile`. Every optional field has a
//! documented default; only missing identity fields (`id`, `name`) are
//! an error. Side-effect free.

use crate::error::AdvisoryError;
use crate::models::{AdvisoryProfile, LiquidityNeeds, RiskTolerance};
use crate::Result;
use serde_json::Value;

/// Default age when the record carries none
const DEFAULT_AGE_YEARS: u32 = 35;

/// Resolve a loosely-typed customer record into a canonical profile.
///
/// Defaults applied for absent fields:
/// - `risk_tolerance` → moderate
/// - `age_years` → 35
/// - `liquidity_needs` → medium
/// - `total_assets`, `annual_income`, `investment_experience_years` → 0
/// - `financial_goals` → empty, `industry_context` → none
pub fn resolve(raw: &Value) -> Result<AdvisoryProfile> {
    let id = string_field(raw, &["id", "customer_id", "customerId"])
        .ok_or_else(|| AdvisoryError::ProfileIncomplete("missing customer id".to_string()))?;

    let name = string_field(raw, &["name", "full_name", "fullName"])
        .ok_or_else(|| AdvisoryError::ProfileIncomplete("missing customer name".to_string()))?;

    let age_years = number_field(raw, &["age", "age_years", "ageYears"])
        .map(|n| n as u32)
        .unwrap_or(DEFAULT_AGE_YEARS);

    let total_assets = number_field(raw, &["total_assets", "totalAssets", "assets"]).unwrap_or(0.0);

    let risk_tolerance = string_field(raw, &["risk_tolerance", "riskTolerance"])
        .and_then(|s| RiskTolerance::from_str_loose(&s))
        .unwrap_or(RiskTolerance::Moderate);

    let investment_experience_years = number_field(
        raw,
        &[
            "investment_experience",
            "investment_experience_years",
            "investmentExperience",
        ],
    )
    .map(|n| n as u32)
    .unwrap_or(0);

    let liquidity_needs = string_field(raw, &["liquidity_needs", "liquidityNeeds"])
        .and_then(|s| LiquidityNeeds::from_str_loose(&s))
        .unwrap_or(LiquidityNeeds::Medium);

    let annual_income =
        number_field(raw, &["annual_income", "annualIncome", "income"]).unwrap_or(0.0);

    let financial_goals = raw
        .get("financial_goals")
        .or_else(|| raw.get("financialGoals"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let industry_context = string_field(raw, &["industry_context", "industryContext", "industry"]);

    Ok(AdvisoryProfile {
        id,
        name,
        age_years,
        total_assets,
        risk_tolerance,
        investment_experience_years,
        liquidity_needs,
        annual_income,
        financial_goals,
        industry_context,
    })
}

/// First non-empty string under any of the given keys
fn string_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        raw.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// First numeric value under any of the given keys.
/// Accepts JSON numbers and numeric strings.
fn number_field(raw: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| {
        let v = raw.get(key)?;
        match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    })
}
