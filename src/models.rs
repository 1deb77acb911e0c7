//! Core data models for the advisory engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Balanced,
    Growth,
    Aggressive,
}

impl RiskTolerance {
    /// Ordering rank, conservative lowest
    pub fn rank(&self) -> u8 {
        match self {
            RiskTolerance::Conservative => 0,
            RiskTolerance::Moderate => 1,
            RiskTolerance::Balanced => 2,
            RiskTolerance::Growth => 3,
            RiskTolerance::Aggressive => 4,
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Some(RiskTolerance::Conservative),
            "moderate" => Some(RiskTolerance::Moderate),
            "balanced" => Some(RiskTolerance::Balanced),
            "growth" => Some(RiskTolerance::Growth),
            "aggressive" => Some(RiskTolerance::Aggressive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LiquidityNeeds {
    Short,
    Medium,
    Long,
}

impl LiquidityNeeds {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "short" => Some(LiquidityNeeds::Short),
            "medium" => Some(LiquidityNeeds::Medium),
            "long" => Some(LiquidityNeeds::Long),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Stocks,
    Bonds,
    Cash,
}

//
// ================= Profile =================
//

/// Canonical customer snapshot built once per request by the
/// profile resolver. Never mutated, only replaced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvisoryProfile {
    pub id: String,
    pub name: String,
    pub age_years: u32,
    pub total_assets: f64,
    pub risk_tolerance: RiskTolerance,
    pub investment_experience_years: u32,
    pub liquidity_needs: LiquidityNeeds,
    pub annual_income: f64,
    pub financial_goals: Vec<String>,
    pub industry_context: Option<String>,
}

//
// ================= Allocation =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationResult {
    /// 0..=100
    pub risk_score: u8,
    /// Percentages per asset class; always sums to exactly 100.
    pub allocation: BTreeMap<AssetClass, u8>,
    pub recommended_products: Vec<String>,
    pub strategy_label: String,
}

impl AllocationResult {
    pub fn percent(&self, class: AssetClass) -> u8 {
        self.allocation.get(&class).copied().unwrap_or(0)
    }
}

//
// ================= Advisory request / response =================
//

/// Signed headers attached to an outbound advisory request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedHeaders {
    pub authorization: String,
    pub date: String,
    pub host: String,
}

/// Envelope sent to the remote advisory provider.
#[derive(Debug, Clone, Serialize)]
pub struct AdvisoryRequest {
    pub request_id: Uuid,
    pub prompt: String,
    #[serde(skip)]
    pub headers: SignedHeaders,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvisoryResponse {
    pub narrative: String,
    pub model_id: String,
    /// True whenever the narrative was synthesized locally rather
    /// than returned by the remote provider.
    pub is_fallback: bool,
    pub generated_at: DateTime<Utc>,
}

//
// ================= User selections =================
//

/// Free-form inputs from the caller that feed the advisory prompt
/// and the cache fingerprint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserSelections {
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub horizon: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

//
// ================= Composite result =================
//

/// Composite returned by the orchestrator for a single request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdviceBundle {
    pub customer_profile: AdvisoryProfile,
    pub allocation: AllocationResult,
    pub advisory: AdvisoryResponse,
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskTolerance::Conservative => "Conservative",
            RiskTolerance::Moderate => "Moderate",
            RiskTolerance::Balanced => "Balanced",
            RiskTolerance::Growth => "Growth",
            RiskTolerance::Aggressive => "Aggressive",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for LiquidityNeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LiquidityNeeds::Short => "Short-Term",
            LiquidityNeeds::Medium => "Medium-Term",
            LiquidityNeeds::Long => "Long-Term",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetClass::Stocks => "stocks",
            AssetClass::Bonds => "bonds",
            AssetClass::Cash => "cash",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_tolerance_rank_ordering() {
        assert!(RiskTolerance::Conservative.rank() < RiskTolerance::Moderate.rank());
        assert!(RiskTolerance::Growth.rank() < RiskTolerance::Aggressive.rank());
    }

    #[test]
    fn test_loose_parsing() {
        assert_eq!(
            RiskTolerance::from_str_loose(" Aggressive "),
            Some(RiskTolerance::Aggressive)
        );
        assert_eq!(RiskTolerance::from_str_loose("yolo"), None);
        assert_eq!(
            LiquidityNeeds::from_str_loose("SHORT"),
            Some(LiquidityNeeds::Short)
        );
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&RiskTolerance::Balanced).unwrap();
        assert_eq!(json, "\"balanced\"");
        let back: RiskTolerance = serde_json::from_str("\"growth\"").unwrap();
        assert_eq!(back, RiskTolerance::Growth);
    }
}
