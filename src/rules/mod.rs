//! Allocation rules engine
//!
//! Deterministic decision tables mapping a profile to a risk score,
//! an asset allocation, and a product shortlist. Pure and total: any
//! profile value is coerced into range before lookup, so there is no
//! error path.

use crate::models::{AdvisoryProfile, AllocationResult, AssetClass, RiskTolerance};
use std::collections::BTreeMap;

//
// ================= Age buckets =================
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgeBucket {
    Under35,
    MidCareer, // 35..=50
    Over50,
}

/// Boundary ages belong to the higher bucket (inclusive lower bound).
fn age_bucket(age: u32) -> AgeBucket {
    if age < 35 {
        AgeBucket::Under35
    } else if age <= 50 {
        AgeBucket::MidCareer
    } else {
        AgeBucket::Over50
    }
}

fn clamp_age(age: u32) -> u32 {
    age.clamp(18, 100)
}

//
// ================= Decision tables =================
//

/// Base {stocks, bonds, cash} percentages. 3 age buckets x 5 tolerance
/// values; every row sums to 100.
fn base_allocation(bucket: AgeBucket, tolerance: RiskTolerance) -> (f64, f64, f64) {
    use AgeBucket::*;
    use RiskTolerance::*;
    match (bucket, tolerance) {
        (Under35, Conservative) => (30.0, 50.0, 20.0),
        (Under35, Moderate) => (45.0, 40.0, 15.0),
        (Under35, Balanced) => (60.0, 30.0, 10.0),
        (Under35, Growth) => (75.0, 20.0, 5.0),
        (Under35, Aggressive) => (85.0, 10.0, 5.0),

        (MidCareer, Conservative) => (25.0, 55.0, 20.0),
        (MidCareer, Moderate) => (40.0, 45.0, 15.0),
        (MidCareer, Balanced) => (55.0, 35.0, 10.0),
        (MidCareer, Growth) => (70.0, 25.0, 5.0),
        (MidCareer, Aggressive) => (80.0, 15.0, 5.0),

        (Over50, Conservative) => (20.0, 55.0, 25.0),
        (Over50, Moderate) => (30.0, 50.0, 20.0),
        (Over50, Balanced) => (45.0, 40.0, 15.0),
        (Over50, Growth) => (55.0, 35.0, 10.0),
        (Over50, Aggressive) => (65.0, 25.0, 10.0),
    }
}

const CONSERVATIVE_TIER_PRODUCTS: &[&str] = &[
    "Government Bond Ladder",
    "Investment-Grade Bond Fund",
    "Money Market Fund",
    "Dividend Aristocrats Fund",
];

const MEDIUM_TIER_PRODUCTS: &[&str] = &[
    "Total Market Index Fund",
    "Balanced 60/40 Fund",
    "Corporate Bond Fund",
    "REIT Income Fund",
];

const HIGH_TIER_PRODUCTS: &[&str] = &[
    "Growth Equity Fund",
    "Small-Cap Growth Fund",
    "Emerging Markets Fund",
    "Technology Sector Fund",
];

const BEGINNER_PRODUCTS: &[&str] = &["Target-Date Retirement Fund", "Robo-Advised Core Portfolio"];

//
// ================= Evaluation =================
//

/// Evaluate a profile into an allocation result.
///
/// Idempotent: identical profiles always yield identical results.
pub fn evaluate(profile: &AdvisoryProfile) -> AllocationResult {
    let age = clamp_age(profile.age_years);
    let bucket = age_bucket(age);

    let (stocks_f, bonds_f, _) = base_allocation(bucket, profile.risk_tolerance);

    // Stocks and bonds round to integers; cash absorbs the remainder
    // so the sum is always exactly 100.
    let stocks = stocks_f.round().clamp(0.0, 100.0) as u8;
    let bonds = (bonds_f.round().clamp(0.0, 100.0) as u8).min(100 - stocks);
    let cash = 100 - stocks - bonds;

    let mut allocation = BTreeMap::new();
    allocation.insert(AssetClass::Stocks, stocks);
    allocation.insert(AssetClass::Bonds, bonds);
    allocation.insert(AssetClass::Cash, cash);

    AllocationResult {
        risk_score: risk_score(profile, age),
        allocation,
        recommended_products: recommended_products(profile, age),
        strategy_label: strategy_label(profile, bucket),
    }
}

/// Risk score on [0,100], starting at 50 and adjusted by age,
/// tolerance, assets, and income.
fn risk_score(profile: &AdvisoryProfile, age: u32) -> u8 {
    let mut score: i32 = 50;

    if age < 30 {
        score += 20;
    } else if age < 50 {
        score += 10;
    }
    if age > 60 {
        score -= 20;
    }

    score += match profile.risk_tolerance {
        RiskTolerance::Conservative => -30,
        RiskTolerance::Moderate => -15,
        RiskTolerance::Balanced => 0,
        RiskTolerance::Growth => 15,
        RiskTolerance::Aggressive => 30,
    };

    if profile.total_assets >= 1_000_000.0 {
        score += 20;
    } else if profile.total_assets < 100_000.0 {
        score -= 20;
    }

    if profile.annual_income > 200_000.0 {
        score += 15;
    } else if profile.annual_income < 50_000.0 {
        score -= 10;
    }

    score.clamp(0, 100) as u8
}

/// Product shortlist: tolerance tier, pruned of growth-labeled
/// products past age 50, beginner products appended under 3 years
/// of experience. De-duplicated, order-stable.
fn recommended_products(profile: &AdvisoryProfile, age: u32) -> Vec<String> {
    let tier: &[&str] = match profile.risk_tolerance {
        RiskTolerance::Conservative | RiskTolerance::Moderate => CONSERVATIVE_TIER_PRODUCTS,
        RiskTolerance::Balanced => MEDIUM_TIER_PRODUCTS,
        RiskTolerance::Growth | RiskTolerance::Aggressive => HIGH_TIER_PRODUCTS,
    };

    let mut products: Vec<String> = tier
        .iter()
        .filter(|p| !(age > 50 && p.contains("Growth")))
        .map(|p| p.to_string())
        .collect();

    if profile.investment_experience_years < 3 {
        for p in BEGINNER_PRODUCTS {
            products.push(p.to_string());
        }
    }

    let mut seen = std::collections::HashSet::new();
    products.retain(|p| seen.insert(p.clone()));
    products
}

/// Age-tier label + asset-tier label
fn strategy_label(profile: &AdvisoryProfile, bucket: AgeBucket) -> String {
    let age_label = match bucket {
        AgeBucket::Under35 => "Early Accumulation",
        AgeBucket::MidCareer => "Mid-Career Building",
        AgeBucket::Over50 => "Capital Preservation",
    };

    let asset_label = if profile.total_assets < 100_000.0 {
        "Foundation Portfolio"
    } else if profile.total_assets < 500_000.0 {
        "Core Portfolio"
    } else if profile.total_assets < 2_000_000.0 {
        "Advanced Portfolio"
    } else {
        "Premier Portfolio"
    };

    format!("{} - {}", age_label, asset_label)
}
