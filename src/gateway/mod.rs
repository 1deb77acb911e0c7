//! Advisory gateway
//!
//! The only component performing network I/O. Builds a signed request
//! to the remote advisory provider, sends it once (no retries), and on
//! any failure synthesizes a templated fallback narrative. Uses a
//! long-lived reqwest::Client for connection pooling.
//!
//! Attempt flow: Idle -> Signing -> Sent -> {Succeeded | TimedOut | Rejected},
//! with TimedOut/Rejected routed into fallback synthesis.

pub mod fallback;
pub mod signing;

use crate::config::GatewayConfig;
use crate::error::AdvisoryError;
use crate::models::{
    AdvisoryProfile, AdvisoryRequest, AdvisoryResponse, AllocationResult, AssetClass,
    UserSelections,
};
use crate::Result;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Seam between the orchestrator and whatever produces advice.
#[async_trait]
pub trait AdviceProvider: Send + Sync {
    async fn request_advice(
        &self,
        profile: &AdvisoryProfile,
        allocation: &AllocationResult,
        selections: &UserSelections,
    ) -> Result<AdvisoryResponse>;
}

/// Terminal states of a single provider attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptOutcome {
    Succeeded,
    TimedOut,
    Rejected,
}

/// Gateway to the remote advisory provider
pub struct AdvisoryGateway {
    client: Client,
    config: GatewayConfig,
}

impl AdvisoryGateway {
    pub fn new(config: GatewayConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()
            .expect("Failed to build HTTP client");

        Self { client, config }
    }

    /// Single signed attempt against the provider. Dropping the future
    /// aborts the in-flight request.
    async fn attempt(&self, prompt: &str) -> (AttemptOutcome, Result<AdvisoryResponse>) {
        // Signing
        let date = signing::http_date(Utc::now());
        let headers = match signing::sign_request(
            &self.config.api_key,
            &self.config.api_secret,
            &self.config.host,
            "POST",
            &self.config.path,
            &date,
        ) {
            Ok(h) => h,
            Err(e) => return (AttemptOutcome::Rejected, Err(e)),
        };

        let envelope = AdvisoryRequest {
            request_id: Uuid::new_v4(),
            prompt: prompt.to_string(),
            headers,
        };

        let body = ProviderRequest {
            model: self.config.model.clone(),
            messages: vec![
                ProviderMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ProviderMessage {
                    role: "user".to_string(),
                    content: envelope.prompt.clone(),
                },
            ],
        };

        debug!(request_id = %envelope.request_id, "Sending advisory request");

        // Sent
        let response = match self
            .client
            .post(self.config.endpoint_url())
            .header("Authorization", &envelope.headers.authorization)
            .header("Date", &envelope.headers.date)
            .header("Host", &envelope.headers.host)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return (
                    AttemptOutcome::TimedOut,
                    Err(AdvisoryError::UpstreamTimeout(e.to_string())),
                );
            }
            Err(e) => {
                return (
                    AttemptOutcome::Rejected,
                    Err(AdvisoryError::UpstreamRejected(e.to_string())),
                );
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return (
                AttemptOutcome::Rejected,
                Err(AdvisoryError::UpstreamRejected(format!(
                    "{}: {}",
                    status, error_text
                ))),
            );
        }

        let parsed: ProviderResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                return (
                    AttemptOutcome::Rejected,
                    Err(AdvisoryError::UpstreamRejected(format!(
                        "malformed payload: {}",
                        e
                    ))),
                );
            }
        };

        let narrative = match parsed
            .choices
            .first()
            .map(|choice| choice.message.content.trim())
            .filter(|content| !content.is_empty())
        {
            Some(content) => content.to_string(),
            None => {
                return (
                    AttemptOutcome::Rejected,
                    Err(AdvisoryError::UpstreamRejected(
                        "empty choices in provider payload".to_string(),
                    )),
                );
            }
        };

        (
            AttemptOutcome::Succeeded,
            Ok(AdvisoryResponse {
                narrative,
                model_id: self.config.model.clone(),
                is_fallback: false,
                generated_at: Utc::now(),
            }),
        )
    }

    /// Absorb a failed attempt into fallback synthesis, or surface
    /// UpstreamUnavailable when fallback is disabled by configuration.
    fn absorb(
        &self,
        profile: &AdvisoryProfile,
        allocation: &AllocationResult,
        cause: AdvisoryError,
    ) -> Result<AdvisoryResponse> {
        if !self.config.fallback_enabled {
            return Err(AdvisoryError::UpstreamUnavailable(cause.to_string()));
        }
        warn!(customer_id = %profile.id, cause = %cause, "Synthesizing fallback advisory");
        Ok(fallback::synthesize(profile, allocation))
    }
}

#[async_trait]
impl AdviceProvider for AdvisoryGateway {
    async fn request_advice(
        &self,
        profile: &AdvisoryProfile,
        allocation: &AllocationResult,
        selections: &UserSelections,
    ) -> Result<AdvisoryResponse> {
        // Credential absence short-circuits to fallback with no network attempt.
        if !self.config.has_credentials() {
            return self.absorb(
                profile,
                allocation,
                AdvisoryError::Signing("advisory credentials not configured".to_string()),
            );
        }

        let prompt = build_prompt(profile, allocation, selections);

        match self.attempt(&prompt).await {
            (AttemptOutcome::Succeeded, Ok(response)) => {
                info!(customer_id = %profile.id, model = %response.model_id, "Advisory received");
                Ok(response)
            }
            (outcome, Err(cause)) => {
                debug!(?outcome, "Provider attempt failed");
                self.absorb(profile, allocation, cause)
            }
            // attempt() pairs Succeeded with Ok and failures with Err
            (_, Ok(response)) => Ok(response),
        }
    }
}

/// Build the user prompt from the profile, the deterministic baseline,
/// and the caller's selections.
fn build_prompt(
    profile: &AdvisoryProfile,
    allocation: &AllocationResult,
    selections: &UserSelections,
) -> String {
    let mut prompt = format!(
        "Client: {} (age {}, {} risk tolerance, {} liquidity needs)\n\
         Assets: {:.0}; annual income: {:.0}; experience: {} years\n\
         Baseline strategy: {} (risk score {}/100)\n\
         Baseline allocation: {}% stocks, {}% bonds, {}% cash\n\
         Shortlisted products: {}\n",
        profile.name,
        profile.age_years,
        profile.risk_tolerance,
        profile.liquidity_needs,
        profile.total_assets,
        profile.annual_income,
        profile.investment_experience_years,
        allocation.strategy_label,
        allocation.risk_score,
        allocation.percent(AssetClass::Stocks),
        allocation.percent(AssetClass::Bonds),
        allocation.percent(AssetClass::Cash),
        allocation.recommended_products.join(", "),
    );

    if !profile.financial_goals.is_empty() {
        prompt.push_str(&format!("Goals: {}\n", profile.financial_goals.join(", ")));
    }
    if let Some(industry) = &profile.industry_context {
        prompt.push_str(&format!("Industry context: {}\n", industry));
    }
    if !selections.focus_areas.is_empty() {
        prompt.push_str(&format!(
            "Requested focus: {}\n",
            selections.focus_areas.join(", ")
        ));
    }
    if let Some(horizon) = &selections.horizon {
        prompt.push_str(&format!("Preferred horizon: {}\n", horizon));
    }
    if let Some(notes) = &selections.notes {
        prompt.push_str(&format!("Notes: {}\n", notes));
    }

    prompt.push_str(
        "\nWrite a personalized investment recommendation grounded in the baseline above.",
    );
    prompt
}

const SYSTEM_PROMPT: &str = "You are a professional financial advisor. \
Ground every recommendation in the deterministic baseline provided, \
be structured and concise, and emphasize risk awareness.";

//
// ================= Provider wire format =================
//

#[derive(Debug, Serialize)]
struct ProviderRequest {
    model: String,
    messages: Vec<ProviderMessage>,
}

#[derive(Debug, Serialize)]
struct ProviderMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    choices: Vec<ProviderChoice>,
}

#[derive(Debug, Deserialize)]
struct ProviderChoice {
    message: ProviderChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ProviderChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LiquidityNeeds, RiskTolerance};
    use crate::rules;

    fn profile() -> AdvisoryProfile {
        AdvisoryProfile {
            id: "CUST_G".to_string(),
            name: "Gail Mensah".to_string(),
            age_years: 45,
            total_assets: 600_000.0,
            risk_tolerance: RiskTolerance::Growth,
            investment_experience_years: 8,
            liquidity_needs: LiquidityNeeds::Long,
            annual_income: 150_000.0,
            financial_goals: vec!["retire at 60".to_string()],
            industry_context: Some("technology".to_string()),
        }
    }

    #[tokio::test]
    async fn test_no_credentials_always_falls_back() {
        let gateway = AdvisoryGateway::new(GatewayConfig::default());
        let p = profile();
        let alloc = rules::evaluate(&p);

        let response = gateway
            .request_advice(&p, &alloc, &UserSelections::default())
            .await
            .unwrap();

        assert!(response.is_fallback);
        assert_eq!(response.model_id, fallback::FALLBACK_MODEL_ID);
    }

    #[tokio::test]
    async fn test_fallback_disabled_surfaces_unavailable() {
        let config = GatewayConfig {
            fallback_enabled: false,
            ..GatewayConfig::default()
        };
        let gateway = AdvisoryGateway::new(config);
        let p = profile();
        let alloc = rules::evaluate(&p);

        let result = gateway
            .request_advice(&p, &alloc, &UserSelections::default())
            .await;

        assert!(matches!(
            result,
            Err(AdvisoryError::UpstreamUnavailable(_))
        ));
    }

    #[test]
    fn test_prompt_carries_profile_and_selections() {
        let p = profile();
        let alloc = rules::evaluate(&p);
        let selections = UserSelections {
            focus_areas: vec!["tax efficiency".to_string()],
            horizon: Some("15 years".to_string()),
            notes: None,
        };

        let prompt = build_prompt(&p, &alloc, &selections);
        assert!(prompt.contains("Gail Mensah"));
        assert!(prompt.contains(&alloc.strategy_label));
        assert!(prompt.contains("tax efficiency"));
        assert!(prompt.contains("15 years"));
        assert!(prompt.contains("retire at 60"));
    }

    #[test]
    fn test_provider_response_parsing() {
        let payload = r#"{"choices":[{"message":{"content":"Diversify gradually."}}]}"#;
        let parsed: ProviderResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Diversify gradually.");

        let empty: ProviderResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.choices.is_empty());
    }
}
