//! Fallback narrative synthesis
//!
//! When the remote provider is unreachable or unconfigured the
//! gateway synthesizes a templated narrative locally. Template choice
//! is seeded from the profile id so repeated fallbacks for the same
//! profile are stable; wording is non-normative, determinism is.

use crate::models::{AdvisoryProfile, AdvisoryResponse, AllocationResult, AssetClass};
use chrono::Utc;
use sha2::{Digest, Sha256};

pub const FALLBACK_MODEL_ID: &str = "fallback-templater";

/// Openers for defensive strategies (labels carrying a preservation signal)
const DEFENSIVE_OPENERS: &[&str] = &[
    "Given where you are, protecting what you have built comes first.",
    "Your plan should prioritize stability and predictable income.",
    "At this stage, capital preservation outweighs chasing returns.",
];

/// Openers for accumulation-phase strategies
const ACCUMULATION_OPENERS: &[&str] = &[
    "Time is on your side, which argues for a growth-oriented posture.",
    "A long runway lets your portfolio absorb short-term volatility.",
    "Compounding works hardest for investors who stay invested early.",
];

/// Openers for mid-career strategies
const BALANCED_OPENERS: &[&str] = &[
    "Balancing growth against stability is the core of your plan.",
    "Your portfolio should keep growing while building in resilience.",
    "This phase rewards steady contributions and disciplined rebalancing.",
];

/// Stable per-profile seed from a SHA-256 digest of the id
fn profile_seed(profile_id: &str) -> usize {
    let digest = Sha256::digest(profile_id.as_bytes());
    usize::from(digest[0])
}

fn opener_pool(strategy_label: &str) -> &'static [&'static str] {
    if strategy_label.contains("Preservation") {
        DEFENSIVE_OPENERS
    } else if strategy_label.contains("Accumulation") {
        ACCUMULATION_OPENERS
    } else {
        BALANCED_OPENERS
    }
}

/// Synthesize a deterministic fallback narrative.
pub fn synthesize(profile: &AdvisoryProfile, allocation: &AllocationResult) -> AdvisoryResponse {
    let pool = opener_pool(&allocation.strategy_label);
    let opener = pool[profile_seed(&profile.id) % pool.len()];

    let products = if allocation.recommended_products.is_empty() {
        "broadly diversified index funds".to_string()
    } else {
        allocation
            .recommended_products
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };

    let narrative = format!(
        "{} {}, your profile maps to our {} strategy with a risk score of {}/100. \
         A suggested mix is {}% stocks, {}% bonds, and {}% cash. \
         Products worth a closer look: {}. \
         This summary was generated locally; a full advisory review was not available.",
        opener,
        profile.name,
        allocation.strategy_label,
        allocation.risk_score,
        allocation.percent(AssetClass::Stocks),
        allocation.percent(AssetClass::Bonds),
        allocation.percent(AssetClass::Cash),
        products,
    );

    AdvisoryResponse {
        narrative,
        model_id: FALLBACK_MODEL_ID.to_string(),
        is_fallback: true,
        generated_at: Utc::now(),
    }
}
